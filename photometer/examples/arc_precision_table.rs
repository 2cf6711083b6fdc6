//! Photometric precision versus magnitude for the ARC 3.5m diffuser setup.
//!
//! Prints the telescope summary, the full breakdown for a 10th magnitude
//! star in i', then a markdown table of exposure, cadence and binned
//! precision across a range of magnitudes in every Sloan filter.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --example arc_precision_table
//! ```

use photometer::cadence::{CadenceEngine, ObservationRequest};
use photometer::hardware::telescope::models;
use photometer::photometry::{FilterCatalog, SyntheticFluxCalculator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let arc = models::arc_35m();
    let filters = FilterCatalog::sloan();
    let engine = CadenceEngine::new(&arc, SyntheticFluxCalculator);

    println!("{arc}");
    println!();

    let i_band = filters.get("i'")?;
    let reference = engine.evaluate(&ObservationRequest::new(10.0, i_band))?;
    println!("{reference}");
    println!();

    let magnitudes: Vec<f64> = (0..=8).map(|step| 8.0 + f64::from(step)).collect();

    println!(
        "| Filter | Mag | Exptime [s] | Cadence [s] | Total [ppm] | 1 min [ppm] | 30 min [ppm] |"
    );
    println!(
        "|--------|-----|-------------|-------------|-------------|-------------|--------------|"
    );

    for name in filters.names() {
        let bandpass = filters.get(name)?;
        let requests: Vec<ObservationRequest> = magnitudes
            .iter()
            .map(|&magnitude| ObservationRequest::new(magnitude, bandpass))
            .collect();

        for (request, result) in requests.iter().zip(engine.evaluate_many(&requests)) {
            let result = match result {
                Ok(result) => result,
                Err(e) => {
                    log::warn!("{name} mag {}: {e}", request.target_magnitude);
                    continue;
                }
            };
            let binned = |window_s: f64| {
                result
                    .binned_noise_ppm(window_s)
                    .map(|ppm| format!("{ppm:.1}"))
                    .unwrap_or_else(|| "-".to_string())
            };

            println!(
                "| {:6} | {:3.0} | {:11.2} | {:11.2} | {:11.1} | {:>11} | {:>12} |",
                name,
                request.target_magnitude,
                result.exposure_time_s,
                result.cadence_s,
                result.noise_budget.total_noise_ppm,
                binned(60.0),
                binned(1800.0)
            );
        }
    }

    Ok(())
}
