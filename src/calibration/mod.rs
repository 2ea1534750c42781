// Calibration module - per-run accelerometer offsets
//
// This module provides two main components:
// 1. CalibrationOffsets: raw per-axis means plus the gravity seed in m/s²
// 2. CalibrationProcedure: accumulates readings and finalizes the offsets
//
// The calibration workflow:
// 1. Create CalibrationProcedure for N samples
// 2. Feed N raw readings at the nominal sample interval
// 3. Finalize to create CalibrationOffsets
//
// Offsets are rebuilt at the start of every run; nothing carries over.

pub mod offsets;
pub mod procedure;

pub use offsets::CalibrationOffsets;
pub use procedure::{run_calibration, CalibrationProcedure, CalibrationProgress};
