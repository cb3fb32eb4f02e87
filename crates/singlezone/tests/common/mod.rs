#![allow(dead_code)]

use onezone_core::{Constant, Imf};
use onezone_singlezone::{Config, ElementConfig, Parameters, Timeline};

/// Routes `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A star-forming zone with oxygen and iron, over 2 Gyr at 0.01 Gyr steps.
pub fn star_forming() -> Config {
    Config::new(Timeline::new(0.0, 2.0, 0.01))
        .with_imf(Imf::Kroupa)
        .with_star_formation_efficiency(Constant(0.5))
        .with_inflow(|t: f64| 10.0 * (-t / 3.0).exp())
        .with_mass_loading(Constant(1.5))
        .with_element(oxygen())
        .with_element(iron())
}

pub fn oxygen() -> ElementConfig {
    ElementConfig::new("O")
        .with_ccsne_yield(Constant(0.015))
        .with_sneia_yield(Constant(0.0))
        .with_agb_yield(Constant(0.0))
}

pub fn iron() -> ElementConfig {
    ElementConfig::new("Fe")
        .with_ccsne_yield(Constant(0.0012))
        .with_sneia_yield(Constant(0.0017))
        .with_agb_yield(Constant(0.0))
}

/// `star_forming` with different parameters.
pub fn star_forming_with(parameters: Parameters) -> Config {
    star_forming().with_parameters(parameters)
}
