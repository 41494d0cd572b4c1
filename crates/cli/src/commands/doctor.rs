use serde::Serialize;
use tourguide_agent::polish::polisher_from_config;
use tourguide_core::config::{AppConfig, LoadOptions};
use tourguide_core::Catalog;

use crate::commands::CommandResult;

const DOCTOR_FAILED_EXIT: u8 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { DOCTOR_FAILED_EXIT };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_catalog(&config));
            checks.push(check_polish_provider(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("catalog_readiness"));
            checks.push(skipped("polish_provider"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn skipped(name: &'static str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: "skipped because configuration did not load".to_string(),
    }
}

fn check_catalog(config: &AppConfig) -> DoctorCheck {
    match Catalog::load(&config.catalog.path) {
        Ok(catalog) if catalog.is_empty() => DoctorCheck {
            name: "catalog_readiness",
            status: CheckStatus::Fail,
            details: format!("`{}` contains no places", config.catalog.path.display()),
        },
        Ok(catalog) => {
            let without_stops =
                catalog.entries().iter().filter(|entry| entry.stops.is_empty()).count();
            DoctorCheck {
                name: "catalog_readiness",
                status: CheckStatus::Pass,
                details: format!(
                    "{} places loaded from `{}` ({without_stops} without itinerary stops)",
                    catalog.len(),
                    config.catalog.path.display()
                ),
            }
        }
        Err(error) => DoctorCheck {
            name: "catalog_readiness",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_polish_provider(config: &AppConfig) -> DoctorCheck {
    match polisher_from_config(&config.polish) {
        Ok(Some(polisher)) => DoctorCheck {
            name: "polish_provider",
            status: CheckStatus::Pass,
            details: format!("{} polisher configured (model `{}`)", polisher.name(), config.polish.model),
        },
        Ok(None) => DoctorCheck {
            name: "polish_provider",
            status: CheckStatus::Pass,
            details: "polish disabled; replies are sent as composed".to_string(),
        },
        Err(error) => DoctorCheck {
            name: "polish_provider",
            status: CheckStatus::Fail,
            details: format!("failed to build polisher: {error}"),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
