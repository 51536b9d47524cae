/* Copyright © 2024-2025 Adam Train <adam@trainrelay.net>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */
use std::fs;
use std::process::Command;

/// Every run pins the date and uses an empty config so results don't depend
/// on the machine.
const COMMON_ARGS: [&str; 4] = ["--today", "2017-12-31", "--config", "tests/test_data/config.toml"];

/// Dynamically collects test cases from a given directory.
fn collect_test_cases(subfolder: &str) -> Vec<(String, String)> {
	let dir_path = format!("tests/test_data/{}", subfolder);

	let mut test_cases = vec![];

	if let Ok(entries) = fs::read_dir(&dir_path) {
		let mut inputs = vec![];
		let mut outputs = vec![];

		for entry in entries.flatten() {
			let file_name =
				entry.file_name().into_string().unwrap_or_default();
			if file_name.ends_with("_in.json") {
				inputs.push(file_name);
			} else if file_name.ends_with("_out.txt") {
				outputs.push(file_name);
			}
		}

		inputs.sort();
		outputs.sort();

		// Pair inputs with corresponding outputs
		for input_file in inputs {
			let output_file = input_file.replace("_in.json", "_out.txt");
			if outputs.contains(&output_file) {
				test_cases.push((input_file, output_file));
			}
		}
	}

	test_cases
}

#[test]
fn test_integration_trial_balance() {
	let test_cases = collect_test_cases("trialbalance");
	assert!(!test_cases.is_empty());
	execute("trialbalance", test_cases, true, "txt", vec![]);
}

#[test]
fn test_integration_csv() {
	let test_cases = collect_test_cases("csv");
	execute("csv", test_cases, true, "csv", vec![]);
}

#[test]
fn test_integration_sorted() {
	let test_cases = collect_test_cases("sorted");
	execute("sorted", test_cases, true, "txt", vec!["--sort", "-4"]);
}

#[test]
fn test_integration_comparison() {
	let test_cases = collect_test_cases("comparison");
	execute(
		"comparison",
		test_cases,
		true,
		"txt",
		vec!["--comparison", "previous_period"],
	);
}

#[test]
fn test_integration_balances_with_hierarchy() {
	let test_cases = collect_test_cases("balances");
	execute("balances", test_cases, true, "txt", vec!["-r", "balance-as-of"]);
}

#[test]
fn test_integration_should_fail() {
	let test_cases = collect_test_cases("failures");
	assert!(!test_cases.is_empty());
	execute("failures", test_cases, false, "txt", vec![]);
}

#[test]
fn test_integration_footnote_needs_text() {
	let output = Command::new("cargo")
		.args(["run", "--", "-f", "tests/test_data/trialbalance/sample_in.json"])
		.args(["footnote", "account_1"])
		.args(COMMON_ARGS)
		.output()
		.expect("Failed to execute process");
	assert!(!output.status.success());
}

#[test]
fn test_integration_footnotes_reach_printout() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir");
	let store = dir.path().join("managers.json").display().to_string();
	let book = "tests/test_data/trialbalance/sample_in.json";

	let added = Command::new("cargo")
		.args(["run", "--", "-f", book, "footnote", "account_1"])
		.args(["--text", "Checked with supplier", "--store", &store])
		.args(COMMON_ARGS)
		.output()
		.expect("Failed to execute process");
	assert!(
		added.status.success(),
		"{}",
		String::from_utf8_lossy(&added.stderr)
	);

	let printed = Command::new("cargo")
		.args(["run", "--", "-f", book, "print", "--store", &store])
		.args(COMMON_ARGS)
		.output()
		.expect("Failed to execute process");

	assert!(printed.status.success());
	let html = String::from_utf8_lossy(&printed.stdout);
	assert!(html.contains("1. Checked with supplier"));
	assert!(!html.contains("Print Preview"));
}

#[test]
fn test_integration_custom_comparison_needs_dates() {
	let book = "tests/test_data/comparison/sample_in.json";

	let output = Command::new("cargo")
		.args(["run", "--", "-f", book, "txt", "--comparison", "custom"])
		.args(COMMON_ARGS)
		.output()
		.expect("Failed to execute process");
	assert!(!output.status.success());

	let output = Command::new("cargo")
		.args(["run", "--", "-f", book, "txt"])
		.args(["--comparison-from", "2016-01-01", "--comparison-to", "2016-12-31"])
		.args(COMMON_ARGS)
		.output()
		.expect("Failed to execute process");
	assert!(
		output.status.success(),
		"{}",
		String::from_utf8_lossy(&output.stderr)
	);
	assert!(String::from_utf8_lossy(&output.stdout).contains("2016"));
}

#[test]
fn test_integration_companies_need_the_multi_company_group() {
	// the clerk belongs to both companies but lacks the group
	let book = "tests/test_data/security/two_company_clerk.json";

	let output = Command::new("cargo")
		.args(["run", "--", "-f", book, "domain", "-u", "2", "--companies", "1,2"])
		.args(COMMON_ARGS)
		.output()
		.expect("Failed to execute process");
	assert!(
		output.status.success(),
		"{}",
		String::from_utf8_lossy(&output.stderr)
	);
	let domain = String::from_utf8_lossy(&output.stdout);
	assert!(domain.contains("('company_id', '=', 1)"), "{}", domain);
	assert!(!domain.contains("('company_id', 'in'"), "{}", domain);

	let output = Command::new("cargo")
		.args(["run", "--", "-f", book, "options", "-u", "2", "--companies", "1,2"])
		.args(COMMON_ARGS)
		.output()
		.expect("Failed to execute process");
	assert!(output.status.success());
	let options: serde_json::Value =
		serde_json::from_slice(&output.stdout).expect("options are JSON");
	assert!(options.get("multi_company").map_or(true, |v| v.is_null()));
}

#[test]
fn test_integration_merge_report_managers() {
	let dir = tempfile::tempdir().expect("Failed to create temp dir");
	let store = dir.path().join("managers.json").display().to_string();
	let book = "tests/test_data/trialbalance/sample_in.json";

	let run = |args: &[&str]| {
		Command::new("cargo")
			.args(["run", "--", "-f", book])
			.args(args)
			.args(["--store", &store])
			.args(COMMON_ARGS)
			.output()
			.expect("Failed to execute process")
	};

	// managers 1 and 2: the trial balance of each company; 3: another report
	let steps: [&[&str]; 3] = [
		&["footnote", "account_1", "--text", "US note"],
		&["footnote", "account_1", "--text", "EU note", "--company", "2"],
		&["footnote", "account_1", "--text", "Other", "-r", "balance-as-of"],
	];
	for step in steps {
		let output = run(step);
		assert!(
			output.status.success(),
			"{}",
			String::from_utf8_lossy(&output.stderr)
		);
	}

	assert!(!run(&["merge", "3"]).status.success());
	assert!(!run(&["merge", "first"]).status.success());
	assert!(run(&["merge", "2"]).status.success());

	let output = run(&["managers"]);
	assert!(output.status.success());
	let managers: serde_json::Value =
		serde_json::from_slice(&output.stdout).expect("managers are JSON");
	let managers = managers.as_array().expect("a list of managers");
	assert_eq!(managers.len(), 2);
	assert_eq!(managers[0]["id"], 1);
	assert_eq!(managers[0]["footnotes"].as_array().map(Vec::len), Some(2));
}

fn execute(
	subfolder: &str,
	test_cases: Vec<(String, String)>,
	should_succeed: bool,
	cmd: &str,
	args: Vec<&str>,
) {
	for (input_file, expected_output_file) in test_cases {
		println!("running for {}...", input_file);

		let loc = format!("{}/{}/{}", "tests/test_data", subfolder, input_file);

		let all_args = [
			vec!["run", "--", "-f", loc.as_str(), cmd],
			COMMON_ARGS.to_vec(),
			args.clone(),
		]
		.concat();

		let output = Command::new("cargo")
			.args(all_args)
			.output()
			.expect("Failed to execute process");

		if !should_succeed {
			assert!(
				!output.status.success(),
				"{} unexpectedly succeeded!",
				input_file
			);
			continue;
		}

		assert!(
			output.status.success(),
			"{} failed processing: {}",
			input_file,
			String::from_utf8_lossy(&output.stderr)
		);

		let stdout = String::from_utf8_lossy(&output.stdout);

		let expected_output = fs::read_to_string(format!(
			"{}/{}/{}",
			"tests/test_data", subfolder, expected_output_file
		))
		.expect("Failed to read expected output file");

		assert_eq!(
			stdout.trim(),
			expected_output.trim(),
			"Output did not match for {}; expected:\n{}\ngot:\n{}",
			input_file,
			expected_output.trim(),
			stdout.trim()
		);
	}
}
