#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

/*
 * xrstem is part of the helio-rs framework.
 *
 * Authors: xrstem contributors
 * (cf. https://github.com/helio-rs/xrstem/graphs/contributors)
 *
 * This framework is shipped under Mozilla Public V2 license.
 */

pub mod batch;
pub mod calibration;
pub mod corrector;
pub mod errors;
pub mod inversion;
pub mod observation;
pub mod prelude;
pub mod response;
pub mod satellite;


pub use crate::{
    inversion::{InversionResult, InversionStatus, TemEstimator},
    observation::Observation,
    satellite::Satellite,
};
