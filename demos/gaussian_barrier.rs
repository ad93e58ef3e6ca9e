use std::{ error::Error, fs::File };
use ndarray as nd;
use ndarray_npy::NpzWriter;
use cnspace::{ Config, Method, Potential, Simulation };

// scatter a 1D wave packet off a Gaussian bump
//
// parameters are read from the TOML file given as the first argument, falling
// back to the ones below

const DEFAULT_CONFIG: &str = r#"
dim = 1
number_points = 256
boundary = "open"
start = 0.0
domain_length = 15.0
dt = 0.001

[pulse]
kind = "plane"
energy = 500.0
center = 2.0
"#;

const STEPS: usize = 1000;
const SAVE_EVERY: usize = 10;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder()
        .format_timestamp_secs()
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path)?,
        None => Config::from_toml_str(DEFAULT_CONFIG)?,
    };

    let barrier = |x: f64| 200.0 * (-(x - 4.0).powi(2) / 2.0).exp();
    let mut sim = Simulation::new(&config, &Potential::new_1d(barrier))?;
    let p0 = sim.total_probability().ok_or("no initial state")?;

    let x = sim.grid().x().clone();
    let v = x.mapv(barrier);
    let mut t: Vec<f64> = Vec::with_capacity(STEPS / SAVE_EVERY + 1);
    let mut rho: Vec<nd::Array1<f64>> = Vec::with_capacity(STEPS / SAVE_EVERY + 1);
    for step in 0..=STEPS {
        if step % SAVE_EVERY == 0 {
            t.push(sim.time());
            rho.push(sim.norm_psi().ok_or("no state")?);
        }
        if step < STEPS { sim.evolve(Method::Direct)?; }
    }
    let p1 = sim.total_probability().ok_or("no state")?;
    println!("probability drift over {} steps: {:.3e}", STEPS, (p1 - p0) / p0);
    println!("final <x> = {:.4}", sim.expect_x().ok_or("no state")?);

    let views: Vec<_> = rho.iter().map(|r| r.view()).collect();
    let rho: nd::Array2<f64> = nd::stack(nd::Axis(0), &views)?;
    let mut npz = NpzWriter::new(File::create("gaussian_barrier.npz")?);
    npz.add_array("x", &x)?;
    npz.add_array("v", &v)?;
    npz.add_array("t", &nd::Array1::from(t))?;
    npz.add_array("rho", &rho)?;
    npz.finish()?;
    Ok(())
}
