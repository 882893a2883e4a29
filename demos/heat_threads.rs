// Runs the reference problem (or a smaller one given on the command line)
// with in-process workers, checks it against the serial baseline and writes
// the final field to CSV.
//
//   cargo run --release --example heat_threads -- [n] [iterations] [workers]
use halo_heat::io::csv::save_csv;
use halo_heat::prelude::*;

fn arg(idx: usize, default: usize) -> usize {
    std::env::args()
        .nth(idx)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn main() -> Result<(), HeatError> {
    let defaults = SimulationConfig::default();
    let cfg = SimulationConfig::new(arg(1, 200), arg(2, 500), defaults.alpha).with_workers(arg(3, 4));

    // 1) distributed run over threads
    let dist = run_threaded(&cfg)?;
    println!(
        "distributed: {} workers, {:.3}s",
        cfg.workers,
        dist.timing.elapsed().as_secs_f64()
    );

    // 2) serial baseline
    let serial = run_serial(&cfg)?;
    println!("serial:      {:.3}s", serial.timing.elapsed().as_secs_f64());

    // 3) shared memory
    #[cfg(feature = "rayon")]
    {
        let shared = run_shared(&cfg)?;
        println!("shared:      {:.3}s", shared.timing.elapsed().as_secs_f64());
        assert_eq!(shared.field, serial.field);
    }

    println!("max |serial - distributed| = {:?}", serial.field.max_abs_diff(&dist.field));
    save_csv(&dist.field, "heat_output_threads.csv")?;
    Ok(())
}
