#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use pl_reflect as reflect;
pub use pl_utils as utils;
