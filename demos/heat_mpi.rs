// Distributed heat diffusion over MPI. The worker count is the MPI world
// size; rank 0 writes the gathered field.
//
//   mpirun -n 4 cargo run --release --features mpi-support --example heat_mpi -- [n] [iterations]
use halo_heat::io::csv::save_csv;
use halo_heat::prelude::*;

fn main() -> Result<(), HeatError> {
    let mut args = std::env::args().skip(1).map(|s| s.parse::<usize>().ok());
    let defaults = SimulationConfig::default();
    let n = args.next().flatten().unwrap_or(defaults.n);
    let iters = args.next().flatten().unwrap_or(defaults.max_iter);

    let comm = MpiComm::new()?;
    let cfg = SimulationConfig::new(n, iters, defaults.alpha).with_workers(comm.size());
    let out = run_worker(&cfg, &comm)?;

    if let Some(field) = out.field {
        println!(
            "MPI version ({} ranks) execution time: {:.4} seconds",
            cfg.workers,
            out.timing.elapsed().as_secs_f64()
        );
        save_csv(&field, "heat_output_mpi.csv")?;
    }
    Ok(())
}
