use faer::Mat;
use orbis_rtree::{Ellipsoid, GeodeticIndex3F64, RbfKernel, RbfSettings};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A smooth synthetic field over a regional window.
fn field(longitude_deg: f64, latitude_deg: f64) -> f64 {
    (longitude_deg / 3.0).sin() * (latitude_deg / 2.0).cos() + 0.1 * latitude_deg
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Sample the field at scattered positions in a 20 x 20 degree window.
    let num_points = 2_000;
    let mut rng = StdRng::seed_from_u64(7);
    let coordinates = Mat::<f64>::from_fn(num_points, 2, |_, col| match col {
        0 => rng.random_range(0.0..20.0),
        _ => rng.random_range(40.0..60.0),
    });
    let values: Vec<f64> = (0..num_points)
        .map(|row| field(*coordinates.get(row, 0), *coordinates.get(row, 1)))
        .collect();

    let mut index = GeodeticIndex3F64::new(Ellipsoid::wgs84());
    index.packing(coordinates.as_ref(), &values)?;

    // Held-out positions well inside the window.
    let num_targets = 500;
    let targets = Mat::<f64>::from_fn(num_targets, 2, |_, col| match col {
        0 => rng.random_range(2.0..18.0),
        _ => rng.random_range(42.0..58.0),
    });

    for kernel in [
        RbfKernel::Cubic,
        RbfKernel::Gaussian,
        RbfKernel::InverseMultiquadric,
        RbfKernel::Linear,
        RbfKernel::Multiquadric,
        RbfKernel::ThinPlate,
    ] {
        let settings = RbfSettings::builder().k(9).kernel(kernel).build();
        let (estimates, counts) = index.radial_basis_function(targets.as_ref(), &settings)?;

        let mut sum_sq = 0.0;
        let mut resolved = 0usize;
        for row in 0..num_targets {
            if counts[row] == 0 || !estimates[row].is_finite() {
                continue;
            }
            resolved += 1;
            let truth = field(*targets.get(row, 0), *targets.get(row, 1));
            sum_sq += (estimates[row] - truth).powi(2);
        }
        let rmse = (sum_sq / resolved.max(1) as f64).sqrt();

        println!(
            "{:>20?}: rmse {:.5} over {}/{} targets",
            kernel, rmse, resolved, num_targets
        );
    }

    Ok(())
}
