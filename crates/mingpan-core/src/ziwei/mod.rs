//! # Zi Wei Dou Shu
//!
//! Palace analysis over a pre-computed astrolabe.
//!
//! Star placement itself is done upstream; this module only reads the
//! placed stars and answers palace, fortune and tri-relation queries.
//! The astrolabe's four pillars bridge into the BaZi engine through
//! [`ZiweiAnalyzer::bazi_chart`].

mod analyzer;
mod astrolabe;
mod palace;
mod transforms;

pub use analyzer::{
    BasicInfo, ComprehensiveReport, FlowAnalysis, FlowYear, FourPillars, MajorFortune, PalaceView,
    ZiweiAnalyzer, ZiweiChart, flow_branch, flow_stem,
};
pub use astrolabe::{Astrolabe, Palace, Star};
pub use palace::PalaceName;
pub use transforms::{FourTransformations, Mutagen};
