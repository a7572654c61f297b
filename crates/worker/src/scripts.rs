//! Simulated medical data processing scripts.
//!
//! Each handler stands in for a real long-running workload: it sleeps for
//! a bounded random interval and returns a fixed-shape result payload.
//! The business logic these represent lives outside the gateway.

use rand::Rng;
use serde_json::{json, Value};

/// Sleep for a random interval within `[min_secs, max_secs)`.
///
/// Handlers run on blocking threads (see `LocalJobQueue`), so a thread
/// sleep is the honest simulation of CPU/IO-bound script work.
fn simulate_work(min_secs: f64, max_secs: f64) {
    let secs = rand::rng().random_range(min_secs..max_secs);
    std::thread::sleep(std::time::Duration::from_secs_f64(secs));
}

fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

// ---------------------------------------------------------------------------
// Module-level entry points (legacy dispatch without a script name)
// ---------------------------------------------------------------------------

pub fn patient_data_analysis(parameters: &Value) -> Result<Value, String> {
    tracing::info!(%parameters, "Module 1 analysis started");
    simulate_work(2.0, 5.0);
    Ok(json!({
        "module": "module1",
        "status": "completed",
        "patients_processed": 150,
        "anomalies_detected": 3,
        "report_path": "/reports/module1_report.pdf",
        "timestamp": now_secs(),
    }))
}

pub fn medical_image_processing(parameters: &Value) -> Result<Value, String> {
    tracing::info!(%parameters, "Module 2 processing started");
    simulate_work(3.0, 7.0);
    Ok(json!({
        "module": "module2",
        "status": "completed",
        "images_processed": 45,
        "diagnosis_suggestions": ["Normal", "Requires attention", "Urgent"],
        "accuracy": 0.95,
        "timestamp": now_secs(),
    }))
}

pub fn drug_interaction_analysis(parameters: &Value) -> Result<Value, String> {
    tracing::info!(%parameters, "Module 3 analysis started");
    simulate_work(2.0, 6.0);
    Ok(json!({
        "module": "module3",
        "status": "completed",
        "drugs_analyzed": 28,
        "interactions_found": 5,
        "risk_level": "moderate",
        "recommendations": ["Monitor patient", "Adjust dosage"],
        "timestamp": now_secs(),
    }))
}

// ---------------------------------------------------------------------------
// Script-level handlers
// ---------------------------------------------------------------------------

pub fn data_validation(parameters: &Value) -> Result<Value, String> {
    tracing::info!(%parameters, "Data validation script started");
    simulate_work(1.0, 3.0);
    Ok(json!({
        "script": "data_validation",
        "module": "module1",
        "status": "completed",
        "records_validated": 500,
        "errors_found": 12,
        "validation_rate": 0.976,
        "timestamp": now_secs(),
    }))
}

pub fn patient_analysis(parameters: &Value) -> Result<Value, String> {
    tracing::info!(%parameters, "Patient analysis script started");
    simulate_work(2.0, 4.0);
    Ok(json!({
        "script": "patient_analysis",
        "module": "module1",
        "status": "completed",
        "patients_processed": 150,
        "anomalies_detected": 3,
        "report_path": "/reports/patient_analysis.pdf",
        "timestamp": now_secs(),
    }))
}

pub fn report_generation(parameters: &Value) -> Result<Value, String> {
    tracing::info!(%parameters, "Report generation script started");
    simulate_work(1.0, 3.0);
    Ok(json!({
        "script": "report_generation",
        "module": "module1",
        "status": "completed",
        "reports_generated": 25,
        "format": "PDF",
        "total_pages": 320,
        "timestamp": now_secs(),
    }))
}

pub fn diagnosis_support(parameters: &Value) -> Result<Value, String> {
    tracing::info!(%parameters, "Diagnosis support script started");
    simulate_work(2.0, 5.0);
    Ok(json!({
        "script": "diagnosis_support",
        "module": "module2",
        "status": "completed",
        "diagnoses_supported": 30,
        "confidence_scores": [0.95, 0.87, 0.92],
        "suggestions": ["Normal", "Requires attention", "Urgent"],
        "timestamp": now_secs(),
    }))
}

pub fn image_processing(parameters: &Value) -> Result<Value, String> {
    tracing::info!(%parameters, "Image processing script started");
    simulate_work(3.0, 6.0);
    Ok(json!({
        "script": "image_processing",
        "module": "module2",
        "status": "completed",
        "images_processed": 45,
        "image_types": ["X-ray", "MRI", "CT"],
        "quality_score": 0.92,
        "timestamp": now_secs(),
    }))
}

pub fn dosage_calculation(parameters: &Value) -> Result<Value, String> {
    tracing::info!(%parameters, "Dosage calculation script started");
    simulate_work(1.0, 3.0);
    Ok(json!({
        "script": "dosage_calculation",
        "module": "module3",
        "status": "completed",
        "calculations_performed": 120,
        "adjustments_recommended": 15,
        "safety_checks_passed": 118,
        "timestamp": now_secs(),
    }))
}

pub fn drug_interaction(parameters: &Value) -> Result<Value, String> {
    tracing::info!(%parameters, "Drug interaction script started");
    simulate_work(2.0, 5.0);
    Ok(json!({
        "script": "drug_interaction",
        "module": "module3",
        "status": "completed",
        "drugs_analyzed": 28,
        "interactions_found": 5,
        "risk_level": "moderate",
        "timestamp": now_secs(),
    }))
}

pub fn side_effects_monitor(parameters: &Value) -> Result<Value, String> {
    tracing::info!(%parameters, "Side effects monitor script started");
    simulate_work(1.0, 4.0);
    Ok(json!({
        "script": "side_effects_monitor",
        "module": "module3",
        "status": "completed",
        "patients_monitored": 85,
        "side_effects_detected": 12,
        "severity_levels": {"mild": 8, "moderate": 3, "severe": 1},
        "timestamp": now_secs(),
    }))
}
