//! Plain-text summaries of telescopes and observation results.

use std::fmt;

use crate::cadence::CadenceResult;
use crate::hardware::TelescopeConfig;

impl fmt::Display for TelescopeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let detector = self.detector();
        let diffuser = self.diffuser();
        let geometry = self.diffuser_geometry();

        writeln!(f, "Telescope:                      {}", self.name())?;
        writeln!(f, "Throughput (flat) (%):          {:.3}", self.throughput_percent())?;
        writeln!(f, "Diameter (cm):                  {:.3}", self.diameter_cm())?;
        writeln!(f, "Fnum:                           {:.3}", self.f_number())?;
        writeln!(f, "Focal length (m):               {:.3}", self.focal_length_m())?;
        writeln!(f, "Detector:                       {}", detector.name)?;
        writeln!(f, "Gain (e/ADU):                   {:.3}", detector.gain_e_per_adu)?;
        writeln!(f, "Pixel size (um):                {:.3}", detector.pixel_size_micron)?;
        writeln!(f, "Num pixels:                     {}", detector.width_pix)?;
        writeln!(f, "Plate scale (arcsec/pix):       {:.3}", self.plate_scale_arcsec_per_pix())?;
        writeln!(f, "FOV (arcmin):                   {:.3}", self.field_of_view_arcmin())?;
        writeln!(f, "Dark noise (e/s/pix):           {:.3}", detector.dark_noise_e_per_pix_per_s)?;
        writeln!(f, "Read noise (e/pix):             {:.3}", detector.read_noise_e)?;
        writeln!(f, "Altitude (m):                   {:.3}", self.altitude_m())?;
        writeln!(f, "Central obstruction (%):        {:.3}", 100.0 * self.central_obstruction())?;
        writeln!(f, "Diffuser angle (deg):           {:.3}", diffuser.opening_angle_deg)?;
        writeln!(f, "Diffuser dist to detector (mm): {:.3}", diffuser.distance_mm)?;
        writeln!(f, "Diffused FWHM (pix):            {:.3}", geometry.fwhm_pixels)?;
        write!(f, "Diffused FWHM (arcsec):         {:.3}", geometry.fwhm_arcsec)
    }
}

impl fmt::Display for CadenceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noise = &self.noise_budget;

        writeln!(f, "##### Exptime #####")?;
        writeln!(f, "Exptime [s]:                  {:.3}", self.exposure_time_s)?;
        writeln!(f, "Total cadence [s]:            {:.3}", self.cadence_s)?;
        writeln!(f, "Obs. Efficiency [%]:          {:.2}", 100.0 * self.observing_efficiency())?;
        writeln!(f, "npix [pix]:                   {:.2}", self.aperture.n_pix)?;
        writeln!(f, "n_b [pix]:                    {:.2}", self.aperture.n_b)?;
        writeln!(f)?;
        writeln!(f, "##### Counts #####")?;
        writeln!(f, "Star counts - Total [adu]:    {:.2}", self.star_adu_total)?;
        writeln!(f, "Star counts - /pix [adu/pix]: {:.2}", self.star_adu_per_pixel)?;
        writeln!(f, "Sky counts - Total [adu]:     {:.2}", self.sky_adu_total)?;
        writeln!(f, "Sky counts - /pix [adu/pix]:  {:.2}", self.sky_adu_per_pixel)?;
        writeln!(f)?;
        writeln!(f, "##### Noise in exptime={:.2}s ######", self.exposure_time_s)?;
        writeln!(f, "Photometric noise [ppm]:      {:.2}", noise.photometric_noise_ppm)?;
        writeln!(f, "Photon noise [ppm]:           {:.2}", noise.photon_noise_ppm)?;
        writeln!(f, "Scintillation noise [ppm]:    {:.2}", noise.scintillation_noise_ppm)?;
        writeln!(f, "Total noise [ppm]:            {:.2}", noise.total_noise_ppm)?;
        writeln!(f)?;
        writeln!(f, "##### Noise ######")?;
        writeln!(f, "Noise in 1min [ppm]:          {}", binned(self, 60.0))?;
        write!(f, "Noise in 30min [ppm]:         {}", binned(self, 1800.0))
    }
}

/// Binned noise for the report, `-` when one cadence does not fit the window
fn binned(result: &CadenceResult, window_s: f64) -> String {
    result
        .binned_noise_ppm(window_s)
        .map(|ppm| format!("{ppm:.2}"))
        .unwrap_or_else(|| "- (window shorter than one cadence)".to_string())
}
