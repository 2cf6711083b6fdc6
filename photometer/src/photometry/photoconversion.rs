//! Photon to photo-electron conversion through a combined spectral response.

use super::response::CombinedResponse;
use super::spectrum::{nm_sub_bands, Spectrum};

/// Photo-electron flux in e⁻ s⁻¹ cm⁻² seen through `response`.
///
/// The spectrum is integrated in 1 nm sub-bands over the wavelengths where
/// the QE, throughput and bandpass overlap; each sub-band's photons are
/// weighted by the combined response at its center. Returns 0.0 when the
/// responses do not overlap.
pub fn photo_electron_flux<S: Spectrum + ?Sized>(spectrum: &S, response: &CombinedResponse) -> f64 {
    let Some(band) = response.band() else {
        return 0.0;
    };

    nm_sub_bands(&band)
        .iter()
        .map(|sub_band| spectrum.photon_flux(sub_band) * response.at(sub_band.center()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photometry::{Band, Bandpass, FlatStellarSpectrum, QuantumEfficiency, Throughput};
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_response_counts_every_photon() {
        let band = Band::from_nm_bounds(400.0, 600.0);
        let qe = QuantumEfficiency::from_notch(&band, 1.0).unwrap();
        let throughput = Throughput::uniform(1.0).unwrap();
        let bandpass = Bandpass::top_hat("wide", 400.0, 600.0).unwrap();
        let response = CombinedResponse::new(&qe, &throughput, &bandpass);

        let spectrum = FlatStellarSpectrum::from_ab_mag(0.0);
        let photons = spectrum.photon_flux(&band);
        let electrons = photo_electron_flux(&spectrum, &response);

        assert_relative_eq!(electrons, photons, max_relative = 0.01);
    }

    #[test]
    fn test_response_scales_linearly() {
        let band = Band::from_nm_bounds(400.0, 600.0);
        let qe = QuantumEfficiency::from_notch(&band, 0.5).unwrap();
        let throughput = Throughput::uniform(0.4).unwrap();
        let bandpass = Bandpass::top_hat("wide", 400.0, 600.0).unwrap();
        let response = CombinedResponse::new(&qe, &throughput, &bandpass);

        let spectrum = FlatStellarSpectrum::from_ab_mag(0.0);
        let ratio = photo_electron_flux(&spectrum, &response) / spectrum.photon_flux(&band);

        assert_relative_eq!(ratio, 0.2, max_relative = 0.01);
    }

    #[test]
    fn test_disjoint_response_gives_zero() {
        let qe = QuantumEfficiency::from_notch(&Band::from_nm_bounds(400.0, 500.0), 1.0).unwrap();
        let throughput = Throughput::uniform(1.0).unwrap();
        let bandpass = Bandpass::top_hat("red", 600.0, 700.0).unwrap();
        let response = CombinedResponse::new(&qe, &throughput, &bandpass);

        let spectrum = FlatStellarSpectrum::from_ab_mag(0.0);
        assert_eq!(photo_electron_flux(&spectrum, &response), 0.0);
    }
}
