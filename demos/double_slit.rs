use std::{ error::Error, fs::File };
use ndarray as nd;
use ndarray_npy::NpzWriter;
use cnspace::{ Boundary, Config, Method, Potential, Pulse, Simulation };

// 2D double-slit diffraction of a plane pulse

const STEPS: usize = 300;
const SAVE_EVERY: usize = 10;

// wall at x ∊ (0.5, 0.55) with two slits of width 0.1 centered 0.2 apart
// around y = 1
fn double_slit(x: f64, y: f64) -> f64 {
    const SPAN: f64 = 0.3;
    const SLIT: f64 = 0.1;
    const X0: f64 = 0.5;
    const Y0: f64 = 1.0;
    let in_wall = x > X0 && x < X0 + 0.05;
    let outside = y < Y0 - SPAN / 2.0 || y > Y0 + SPAN / 2.0;
    let between = y > Y0 - SPAN / 2.0 + SLIT && y < Y0 + SPAN / 2.0 - SLIT;
    if in_wall && (outside || between) { 50000.0 } else { 0.0 }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder()
        .format_timestamp_secs()
        .init();

    let config = Config::new(2, 100, Boundary::Open, (0.0, 0.0), 2.0, 1e-3)
        .with_pulse(Pulse::plane(500.0, 0.1).with_width(0.1));
    let mut sim = Simulation::new(&config, &Potential::new_2d(double_slit))?;
    let grid = sim.grid().clone();
    let v: nd::Array1<f64>
        = grid.coords().rows().into_iter()
        .map(|r| double_slit(r[0], r[1]))
        .collect();

    let mut frames: Vec<nd::Array2<f64>> = Vec::new();
    for step in 0..=STEPS {
        if step % SAVE_EVERY == 0 {
            frames.push(sim.norm_psi_2d().ok_or("no state")?);
            log::info!("step {}: P = {:.6}", step, sim.total_probability().unwrap_or(0.0));
        }
        if step < STEPS { sim.evolve(Method::Direct)?; }
    }

    let views: Vec<_> = frames.iter().map(|f| f.view()).collect();
    let rho: nd::Array3<f64> = nd::stack(nd::Axis(0), &views)?;
    let mut npz = NpzWriter::new(File::create("double_slit.npz")?);
    npz.add_array("x", grid.x())?;
    npz.add_array("y", grid.y().ok_or("grid is not 2D")?)?;
    npz.add_array("v", &grid.unflatten(&v).ok_or("grid is not 2D")?)?;
    npz.add_array("rho", &rho)?;
    npz.finish()?;
    Ok(())
}
