use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use super::SeedResult;
use crate::util::report_timestamp;

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    results: &'a [SeedResult],
}

pub fn generate_console_report<W: Write + ?Sized>(
    writer: &mut W,
    results: &[SeedResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Simulation Results Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "==============================".cyan())?;
    writeln!(writer, "Generated: {}", report_timestamp())?;

    let total_seeds = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = total_seeds - passed;

    writeln!(writer, "Total seeds: {total_seeds}")?;
    writeln!(writer, "Passed: {}", passed.to_string().green())?;
    writeln!(writer, "Failed: {}", failed.to_string().red())?;
    #[allow(clippy::cast_precision_loss)]
    let success_rate = if total_seeds == 0 {
        0.0
    } else {
        (passed as f64 / total_seeds as f64) * 100.0
    };
    writeln!(writer, "Success rate: {success_rate:.1}%")?;
    writeln!(writer, "Total time: {total_duration:?}")?;
    writeln!(writer)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            writer,
            "{} seed {} ({})",
            status,
            result.seed.to_string().bold(),
            result.strategy.label()
        )?;
        writeln!(
            writer,
            "   Survivors: {}/{} | mean level {:.1} | average time {:?}",
            result.survivors(),
            result.runs.len(),
            result.mean_level(),
            result.average_duration
        )?;
        if let Some(best) = result.runs.iter().max_by_key(|run| run.final_level) {
            writeln!(
                writer,
                "   Best run: level {} with {} kills, {} gold, toughest foe {}",
                best.final_level,
                best.kills,
                best.gold,
                best.highest_species.as_deref().unwrap_or("-")
            )?;
        }
        if !result.failures.is_empty() {
            writeln!(writer, "   Failures:")?;
            for failure in &result.failures {
                writeln!(writer, "     • {}", failure.red())?;
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(
    writer: &mut W,
    results: &[SeedResult],
) -> Result<()> {
    let report = JsonReport {
        generated_at: report_timestamp(),
        results,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    writer: &mut W,
    results: &[SeedResult],
) -> Result<()> {
    writeln!(writer, "# Delve Simulation Results\n")?;
    writeln!(writer, "_Generated {}_\n", report_timestamp())?;

    let total_seeds = results.len();
    let passed = results.iter().filter(|r| r.passed).count();

    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "- **Total seeds**: {total_seeds}")?;
    writeln!(writer, "- **Passed**: {passed}")?;
    writeln!(writer, "- **Failed**: {}\n", total_seeds - passed)?;

    writeln!(writer, "## Runs\n")?;
    writeln!(
        writer,
        "| Seed | Iter | Strategy | Level | XP | Gold | Kills | Flees | Died | Turns | Toughest foe |"
    )?;
    writeln!(
        writer,
        "|-----:|-----:|----------|------:|---:|-----:|------:|------:|:----:|------:|--------------|"
    )?;
    for result in results {
        for run in &result.runs {
            writeln!(
                writer,
                "| {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} |",
                run.seed,
                run.iteration + 1,
                run.strategy.label(),
                run.final_level,
                run.experience,
                run.gold,
                run.kills,
                run.flees,
                if run.survived() { "" } else { "☠" },
                run.turns,
                run.highest_species.as_deref().unwrap_or("-")
            )?;
        }
    }
    writeln!(writer)?;

    let failures: Vec<&String> = results.iter().flat_map(|r| &r.failures).collect();
    if !failures.is_empty() {
        writeln!(writer, "## Failures\n")?;
        for failure in failures {
            writeln!(writer, "- {failure}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::policy::Strategy;
    use crate::logic::simulation::RunSummary;

    fn sample_result(passed: bool) -> SeedResult {
        SeedResult {
            seed: 42,
            strategy: Strategy::Balanced,
            passed,
            iterations_run: 1,
            failures: if passed {
                Vec::new()
            } else {
                vec!["Iteration 1 (seed 42): health 12 above max 10".to_string()]
            },
            average_duration: Duration::from_millis(3),
            runs: vec![RunSummary {
                seed: 42,
                iteration: 0,
                user_id: "sim-00000000000000aa".to_string(),
                strategy: Strategy::Balanced,
                final_level: 4,
                experience: 61,
                gold: 19,
                kills: 6,
                flees: 1,
                deaths: 1,
                turns: 20,
                highest_species: Some("Giant Spider".to_string()),
                violations: Vec::new(),
            }],
        }
    }

    #[test]
    fn json_report_is_stamped() {
        let mut buffer = Vec::new();
        generate_json_report(&mut buffer, &[sample_result(true)]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert!(value["generated_at"].as_str().unwrap().ends_with('Z'));
        assert_eq!(value["results"][0]["runs"][0]["final_level"], 4);
    }

    #[test]
    fn markdown_report_lists_runs_and_failures() {
        let mut buffer = Vec::new();
        generate_markdown_report(&mut buffer, &[sample_result(false)]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("# Delve Simulation Results"));
        assert!(text.contains("| 42 | 1 | Balanced | 4 | 61 | 19 | 6 | 1 | ☠ | 20 | Giant Spider |"));
        assert!(text.contains("## Failures"));
    }

    #[test]
    fn console_report_handles_empty_results() {
        let mut buffer = Vec::new();
        generate_console_report(&mut buffer, &[], Duration::ZERO).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("Success rate: 0.0%"));
    }
}
