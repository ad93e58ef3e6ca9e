use std::error::Error;
use cnspace::{ Boundary, Config, Method, Potential, Pulse, Simulation, SolverConfig };

// 2D scattering of a circular packet off a repulsive 1/r center, stepped with
// an iterative solver and checked against time reversal

const STEPS: usize = 200;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder()
        .format_timestamp_secs()
        .init();

    let center = (0.5, 1.0);
    let coulomb = move |x: f64, y: f64| {
        10.0 / (x - center.0).hypot(y - center.1)
    };
    let config = Config::new(2, 100, Boundary::Open, (0.0, 0.0), 2.0, 1e-3)
        .with_solver(SolverConfig::default().with_tol(1e-10))
        .with_pulse(
            Pulse::circular(1000.0, (0.1, 1.0), (1.0, 0.0)).with_width(0.1));
    let mut sim = Simulation::new(&config, &Potential::new_2d(coulomb))?;
    let psi0 = sim.psi().ok_or("no initial state")?.clone();
    let p0 = sim.total_probability().ok_or("no state")?;

    sim.evolve_n(STEPS, Method::BiCgStab)?;
    println!(
        "t = {:.3}: <x> = {:.4}, <E> = {:.2}",
        sim.time(),
        sim.expect_x().ok_or("no state")?,
        sim.expect_energy().ok_or("no state")?,
    );
    for _ in 0..STEPS {
        sim.evolve_back(Method::Gmres)?;
    }
    let psi = sim.psi().ok_or("no state")?;
    let err
        = psi.iter().zip(&psi0)
        .map(|(a, b)| (a - b).norm_sqr())
        .sum::<f64>()
        .sqrt();
    println!("probability drift: {:.3e}", sim.total_probability().unwrap_or(0.0) / p0 - 1.0);
    println!("time-reversal error: {:.3e}", err);
    Ok(())
}
