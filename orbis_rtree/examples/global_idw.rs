use faer::Mat;
use orbis_rtree::{Ellipsoid, GeodeticIndex3F64, IdwSettings};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A smooth synthetic field over the globe.
fn field(longitude_deg: f64, latitude_deg: f64) -> f64 {
    let lon = longitude_deg.to_radians();
    let lat = latitude_deg.to_radians();
    lat.sin() + 0.5 * (2.0 * lon).cos() * lat.cos()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Sample the field at scattered positions.
    let num_points = 20_000;
    let mut rng = StdRng::seed_from_u64(42);
    let coordinates = Mat::<f64>::from_fn(num_points, 2, |_, col| match col {
        0 => rng.random_range(-180.0..180.0),
        _ => rng.random_range(-85.0..85.0),
    });
    let values: Vec<f64> = (0..num_points)
        .map(|row| field(*coordinates.get(row, 0), *coordinates.get(row, 1)))
        .collect();

    // Bulk-load the index.
    let mut index = GeodeticIndex3F64::new(Ellipsoid::wgs84());
    index.packing(coordinates.as_ref(), &values)?;

    // Interpolate onto a coarse regular grid.
    let (num_lon, num_lat) = (72, 36);
    let grid = Mat::<f64>::from_fn(num_lon * num_lat, 2, |row, col| match col {
        0 => -180.0 + 360.0 * (row % num_lon) as f64 / num_lon as f64,
        _ => -85.0 + 170.0 * (row / num_lon) as f64 / num_lat as f64,
    });

    let settings = IdwSettings::builder().k(9).p(2).build();
    let (estimates, counts) = index.inverse_distance_weighting(grid.as_ref(), &settings)?;

    // Compare against the analytic field where a result was produced.
    let mut max_error = 0.0f64;
    let mut resolved = 0usize;
    for row in 0..grid.nrows() {
        if counts[row] == 0 {
            continue;
        }
        resolved += 1;
        let truth = field(*grid.get(row, 0), *grid.get(row, 1));
        max_error = max_error.max((estimates[row] - truth).abs());
    }

    println!(
        "interpolated {}/{} grid nodes from {} observations, max abs error {:.4}",
        resolved,
        grid.nrows(),
        index.len(),
        max_error
    );

    Ok(())
}
