//! Carbohydrate absorption and insulin action kernels.
//!
//! Both kernels return 0 for `t <= 0` and are evaluated in minutes.

/// Carbohydrate absorption time constant (minutes)
pub const TAU_CARB: f64 = 60.0;
/// Insulin onset time constant (minutes)
pub const TAU_INSULIN_ONSET: f64 = 20.0;
/// Insulin duration time constant (minutes)
pub const TAU_INSULIN_DURATION: f64 = 160.0;

/// Shape-2 gamma kernel `(t / tau²) · e^(-t / tau)`, peaking at `t = tau`.
///
/// Callers scale by carb grams and step size to get grams absorbed per step.
pub fn gamma_kernel(t: f64, tau: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    (t / (tau * tau)) * (-t / tau).exp()
}

/// Biexponential insulin action `e^(-t / tau2) - e^(-t / tau1)`
pub fn insulin_kernel(t: f64, tau1: f64, tau2: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    (-t / tau2).exp() - (-t / tau1).exp()
}

/// Insulin kernel divided by `tau2 - tau1`.
///
/// This is an approximate normalization, not the exact integral of the
/// biexponential. Downstream dose-response magnitudes depend on it.
pub fn normalized_insulin_kernel(t: f64, tau1: f64, tau2: f64) -> f64 {
    insulin_kernel(t, tau1, tau2) / (tau2 - tau1)
}
