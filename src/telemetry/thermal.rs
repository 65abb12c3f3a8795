//! CPU temperature as a load-derived estimate.
//!
//! Reading the real sensors needs privileged SMC access, which this tool
//! deliberately avoids. The value reported here is an estimate scaled from
//! CPU load between an idle baseline and a full-load ceiling, and is labeled
//! as such in the output. It must never be presented as a sensor reading.

const IDLE_BASELINE_C: f64 = 35.0;
const FULL_LOAD_DELTA_C: f64 = 40.0;

pub fn estimate_cpu_temperature(cpu_percent: f64) -> f64 {
    let load = cpu_percent.clamp(0.0, 100.0) / 100.0;
    IDLE_BASELINE_C + load * FULL_LOAD_DELTA_C
}
