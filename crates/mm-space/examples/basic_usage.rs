use mm_space::*;
use mm_types::*;
use tracing_subscriber::EnvFilter;

fn magnitude() -> Box<dyn Metric<f64>> {
    metric_fn("magnitude", |a: &[f64], b: &[f64]| {
        a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum::<f64>() / a.len() as f64
    })
}

fn contour() -> Box<dyn Metric<f64>> {
    metric_fn("contour", |a: &[f64], b: &[f64]| {
        a.windows(2)
            .zip(b.windows(2))
            .map(|(x, y)| ((x[1] - x[0]) - (y[1] - y[0])).abs())
            .sum::<f64>()
            / (a.len() - 1) as f64
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("Metric space morphing example");

    // Three intervals expressed as frequency ratios: 1/1, 5/4, 3/2
    let start = vec![1.0, 1.25, 1.5];
    let mut space = Space::new(vec![magnitude(), contour()]);
    println!("Created space: {space:?}");

    // Exact target reachable by rearranging the start's own ratios
    let result = space.morph_to(&start, &[0.25, 0.5])?;
    println!("Morph to [0.25, 0.5]: {:?}", result.point());

    // Unreachable under the default delta; loosen it and retry
    let result = space.morph_to(&start, &[0.4, 0.4])?;
    if !result.is_found() {
        println!(
            "Exhausted at {:?} with cost {:.4}; loosening delta",
            result.last_point(),
            result.cost()
        );
        space.set_delta(0.1)?;
    }
    let result = space.morph_to(&start, &[0.4, 0.4])?;
    println!("Morph to [0.4, 0.4]: {:?}", result.point());

    // Re-anchor results so the leading ratio is 1/1
    let anchored = Space::new(vec![magnitude(), contour()])
        .with_delta(0.1)?
        .with_normalizer(ReanchorToIdentity);
    let result = anchored.morph(&start, &[0.4, 0.4], Some(vec![1.5, 1.0, 1.25]))?;
    println!("Re-anchored morph from [1.5, 1.0, 1.25]: {:?}", result.point());

    // Bounded space from configuration: negative targets move toward the low end
    let config = SpaceConfig::from_json(
        r#"{"name": "bounded", "delta": 0.001,
            "neighbors": {"kind": "step", "step": 0.05, "low": 0.0, "high": 1.0}}"#,
    )?;
    let euclidean = metric_fn("euclidean", |a: &[f64], b: &[f64]| {
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y).powi(2))
            .sum::<f64>()
            .sqrt()
    });
    let bounded = Space::from_config(vec![euclidean], &config)?
        .with_boundaries(vec![Boundary::new(vec![0.0, 0.0], vec![0.0, 1.0])])?;
    println!("Bounded space max distance: {:?}", bounded.max_distance());
    let result = bounded.morph_to(&[0.0, 0.5], &[-0.1])?;
    println!("Morph toward lower boundary: {:?}", result.point());

    // Chain morphs with named values
    let bindings = Bindings::new()
        .with_point("start", start.clone())
        .with_vector("first", vec![0.25, 0.5])
        .with_vector("second", vec![0.25, 0.25]);
    let end = space.enter(bindings, |scope| -> MmResult<Option<Vec<f64>>> {
        let first = scope.morph_named("start", "first")?;
        let Some(waypoint) = first.into_point() else {
            return Ok(None);
        };
        Ok(scope
            .morph(&waypoint, scope.vector("second")?, None)?
            .into_point())
    })?;
    println!("Chained morph ended at {end:?}");

    Ok(())
}
