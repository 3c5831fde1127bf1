//! # Reinforced Concrete Capacity Recipes
//!
//! Fixed numeric recipes for the catalogued formulas. Inputs are in mm, mm²
//! and MPa; results are in kN (the `/ 1000` converts N to kN).
//!
//! Each recipe records every intermediate quantity, in order, under a fixed
//! step name. The constants below are part of the published recipes and must
//! not be altered.

use std::f64::consts::PI;

use super::{StepTrace, Variables};
use crate::errors::DesignResult;

/// KDS 14 20 20: φPn,max = 0.80·φ·[α₁·fck·(Ag − Ast) + fy·Ast]
///
/// `A_st` is the total longitudinal steel area, `num_legs × area_bar`.
pub fn kds_compression_capacity(v: &Variables, steps: &mut StepTrace) -> DesignResult<f64> {
    let a_g = steps.record("A_g", v.get("b_w")? * v.get("h")?)?;
    let a_st = steps.record("A_st", v.get("num_legs")? * v.get("area_bar")?)?;
    let phi_comp = steps.record("phi_comp", 0.65)?;
    let alpha_1 = steps.record("alpha_1", 0.85)?;
    steps.record("beta_1", 0.8)?;

    let fck = v.get("fck")?;
    let fy = v.get("fy")?;
    steps.record(
        "phi_Pn_max",
        0.80 * phi_comp * (alpha_1 * fck * (a_g - a_st) + fy * a_st) / 1000.0,
    )
}

/// CSA A23.3 10.10.4: Pr,max = 0.80·[α₁·φc·f'c·(Ag − Ast) + φs·fy·Ast]
pub fn csa_compression_capacity(v: &Variables, steps: &mut StepTrace) -> DesignResult<f64> {
    let a_g = steps.record("A_g", v.get("b_w")? * v.get("h")?)?;
    let a_st = steps.record("A_st", v.get("num_legs")? * v.get("area_bar")?)?;

    let fck = v.get("fck")?;
    let fy = v.get("fy")?;
    let alpha_1 = steps.record("alpha_1", (0.85 - 0.0015 * fck).max(0.67))?;
    steps.record("beta_1", (0.97 - 0.0025 * fck).max(0.67))?;
    let phi_c = steps.record("phi_c", 0.65)?;
    let phi_s = steps.record("phi_s", 0.85)?;
    // Recorded for the trace; the resistance uses phi_c and phi_s.
    steps.record("phi_comp", 0.65)?;

    steps.record(
        "phi_Pr_max",
        0.80 * (alpha_1 * phi_c * fck * (a_g - a_st) + phi_s * fy * a_st) / 1000.0,
    )
}

/// KDS 14 20 22: φVn = φVc + min(φVs, φVs,max)
pub fn kds_shear_capacity(v: &Variables, steps: &mut StepTrace) -> DesignResult<f64> {
    let phi_shear = steps.record("phi_shear", 0.75)?;
    let a_v = steps.record("A_v", v.get("num_legs")? * v.get("area_bar")?)?;

    let lambda = v.get("lambda_conc")?;
    let fck = v.get("fck")?;
    let b_w = v.get("b_w")?;
    let d = v.get("d")?;
    let fy = v.get("fy")?;
    let s = v.get("s_bar")?;

    let phi_v_c = steps.record(
        "phi_V_c",
        phi_shear * (1.0 / 6.0) * lambda * fck.sqrt() * b_w * d / 1000.0,
    )?;
    let phi_v_s = steps.record("phi_V_s", phi_shear * (a_v * fy * d / s) / 1000.0)?;
    let phi_v_s_max = steps.record(
        "phi_V_s_max",
        phi_shear * 0.2 * (1.0 - fck / 250.0) * fck * b_w * d / 1000.0,
    )?;

    steps.record("phi_V_n", phi_v_c + phi_v_s.min(phi_v_s_max))
}

/// CSA A23.3 11.3: Vr = min(Vc + Vs, 0.25·φc·f'c·bw·dv), θ = 35°, β = 0.18
pub fn csa_shear_capacity(v: &Variables, steps: &mut StepTrace) -> DesignResult<f64> {
    let d = v.get("d")?;
    let h = v.get("h")?;
    let d_v = steps.record("d_v", (0.9 * d).max(0.72 * h))?;
    let beta = steps.record("beta", 0.18)?;
    let theta = steps.record("theta", 35.0)?;
    let theta_rad = theta * PI / 180.0;
    let cot_theta = steps.record("cot_theta", theta_rad.cos() / theta_rad.sin())?;
    let phi_conc = steps.record("phi_conc", 0.65)?;
    let phi_steel = steps.record("phi_steel", 0.85)?;
    let a_v = steps.record("A_v", v.get("num_legs")? * v.get("area_bar")?)?;

    let lambda = v.get("lambda_conc")?;
    let fck = v.get("fck")?;
    let b_w = v.get("b_w")?;
    let fy = v.get("fy")?;
    let s = v.get("s_bar")?;

    let phi_v_c = steps.record(
        "phi_V_c",
        phi_conc * lambda * beta * fck.sqrt() * b_w * d_v / 1000.0,
    )?;
    let phi_v_s = steps.record("phi_V_s", phi_steel * a_v * fy * d_v * cot_theta / s / 1000.0)?;
    let phi_v_r = steps.record("phi_V_r", phi_v_c + phi_v_s)?;
    let phi_v_r_max = steps.record("phi_V_r_max", 0.25 * phi_conc * fck * b_w * d_v / 1000.0)?;

    Ok(phi_v_r.min(phi_v_r_max))
}
