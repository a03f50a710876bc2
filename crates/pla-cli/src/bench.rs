//! PLA Benchmark Binary
//!
//! Measures title indexing, session-memory recomputation and per-keystroke
//! latency at different vault sizes (100, 1,000, 5,000 notes).
//! Run with: `cargo run --bin pla-bench --release`

use std::time::Instant;

use pla_core::{DocumentId, EditorBuffer, Settings, TextBuffer};
use pla_suggest::{vault_titles, LinkSuggester};
use pla_vault::Vault;

// ---------------------------------------------------------------------------
// Synthetic data generation
// ---------------------------------------------------------------------------

const COMPANIES: &[&str] = &[
    "Acme", "Globex", "Initech", "Umbrella", "Hooli", "Stark", "Wayne", "Tyrell", "Cyberdyne",
    "Soylent",
];

const TOPICS: &[&str] = &[
    "architecture",
    "performance",
    "deployment",
    "migration",
    "security",
    "roadmap",
    "incident",
    "onboarding",
    "pricing",
    "hot reload",
    "caching",
    "observability",
    "rollback",
    "compliance",
    "release",
];

/// Sentences typed into the active note for keystroke timing.
const TYPED: &[&str] = &[
    "We discussed the deployment plan;",
    "Follow up on migration work ,",
    "Check the observability;, dashboards",
    "company: ",
    "Notes on hot reload;;",
];

fn note_name(i: usize) -> String {
    format!("{} {}", TOPICS[i % TOPICS.len()], i)
}

fn generate_note(i: usize, n: usize) -> String {
    let company = COMPANIES[i % COMPANIES.len()];
    let mut body = format!(
        "---\ncompany: {company}\nprojectId: P-{}\nstatus: open\n---\n# {}\n\n",
        i % 50,
        note_name(i)
    );
    for k in 1..=4 {
        let target = (i * 7 + k * 13) % n;
        body.push_str(&format!("See [[{}]] for {}.\n", note_name(target), TOPICS[k]));
    }
    // Some links point at notes that do not exist yet.
    if i % 5 == 0 {
        body.push_str(&format!("Draft: [[Unwritten {}|later]]\n", i % 97));
    }
    body
}

fn generate_vault(n: usize) -> Vault {
    let mut vault = Vault::in_memory();
    for i in 0..n {
        vault.insert_note(format!("notes/{}.md", note_name(i)).as_str(), &generate_note(i, n));
    }
    vault
}

// ---------------------------------------------------------------------------
// Percentile computation
// ---------------------------------------------------------------------------

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    let idx = idx.saturating_sub(1);
    sorted[idx.min(sorted.len() - 1)]
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

fn format_duration_us(us: f64) -> String {
    if us >= 1_000_000.0 {
        format!("{:.1} s", us / 1_000_000.0)
    } else if us >= 1_000.0 {
        format!("{:.1} ms", us / 1_000.0)
    } else {
        format!("{:.0} us", us)
    }
}

fn format_scale(n: usize) -> String {
    if n >= 1_000 {
        format!("{}K", n / 1_000)
    } else {
        n.to_string()
    }
}

// ---------------------------------------------------------------------------
// Benchmark results
// ---------------------------------------------------------------------------

type MetricRow = (&'static str, fn(&ScaleResult) -> f64);

#[derive(Default)]
struct ScaleResult {
    load_us: f64,
    titles_us: f64,
    recompute_p50_us: f64,
    recompute_p95_us: f64,
    keystroke_p50_us: f64,
    keystroke_p95_us: f64,
    keystroke_p99_us: f64,
    candidates: usize,
}

fn summarize(mut samples: Vec<f64>) -> Vec<f64> {
    samples.sort_by(f64::total_cmp);
    samples
}

// ---------------------------------------------------------------------------
// Benchmark runner for a single scale
// ---------------------------------------------------------------------------

fn run_benchmark(n: usize) -> ScaleResult {
    let mut result = ScaleResult::default();

    let start = Instant::now();
    let mut vault = generate_vault(n);
    result.load_us = start.elapsed().as_micros() as f64;

    let start = Instant::now();
    let titles = vault_titles(&vault);
    result.titles_us = start.elapsed().as_micros() as f64;
    debug_assert!(titles.len() >= n);

    let settings = Settings {
        auto_space: true,
        ..Settings::default()
    };
    let mut suggester = LinkSuggester::new(settings);

    // --- Recompute on note switch ---
    let switches = 20;
    let mut recompute = Vec::with_capacity(switches);
    for i in 0..switches {
        let id = DocumentId::new(format!("notes/{}.md", note_name(i * n / switches)));
        vault.set_active(Some(id));
        let start = Instant::now();
        suggester.on_active_document_changed(&vault);
        recompute.push(start.elapsed().as_micros() as f64);
    }
    let recompute = summarize(recompute);
    result.recompute_p50_us = percentile(&recompute, 50.0);
    result.recompute_p95_us = percentile(&recompute, 95.0);
    let memory = suggester.memory();
    result.candidates = memory.file_links.len() + memory.yaml_links.len() + memory.vault_links.len();

    // --- Keystrokes: trigger check plus suggestions when open ---
    let mut keystrokes = Vec::new();
    for sentence in TYPED {
        let mut buffer = TextBuffer::default();
        for c in sentence.chars() {
            buffer.type_text(&c.to_string());
            let start = Instant::now();
            if suggester.on_trigger(&mut buffer).is_some() {
                let _ = suggester.suggestions();
            }
            keystrokes.push(start.elapsed().as_micros() as f64);
        }
        debug_assert!(!buffer.line(0).is_empty());
        suggester.close();
    }
    let keystrokes = summarize(keystrokes);
    result.keystroke_p50_us = percentile(&keystrokes, 50.0);
    result.keystroke_p95_us = percentile(&keystrokes, 95.0);
    result.keystroke_p99_us = percentile(&keystrokes, 99.0);

    result
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    let scales: &[usize] = &[100, 1_000, 5_000];

    println!();
    println!("PLA Benchmark");
    println!("=============");
    println!(
        "Platform: {} {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    println!();

    eprint!("Warming up... ");
    let _ = run_benchmark(10);
    eprintln!("done.");

    let mut results: Vec<(usize, ScaleResult)> = Vec::new();
    for &n in scales {
        eprint!("Benchmarking {} notes... ", n);
        let start = Instant::now();
        let result = run_benchmark(n);
        eprintln!("done in {:.1}s", start.elapsed().as_secs_f64());
        results.push((n, result));
    }

    println!();

    let col0 = 22;
    let colw = 14;

    print!("| {:col0$}", "Operation");
    for &n in scales {
        print!("| {:>colw$}", format!("{} notes", format_scale(n)));
    }
    println!("|");

    print!("|{}", "-".repeat(col0 + 1));
    for _ in scales {
        print!("|{}", "-".repeat(colw + 1));
    }
    println!("|");

    let rows: Vec<MetricRow> = vec![
        ("Vault Load", |r: &ScaleResult| r.load_us),
        ("Title Index", |r: &ScaleResult| r.titles_us),
        ("Recompute (p50)", |r: &ScaleResult| r.recompute_p50_us),
        ("Recompute (p95)", |r: &ScaleResult| r.recompute_p95_us),
        ("Keystroke (p50)", |r: &ScaleResult| r.keystroke_p50_us),
        ("Keystroke (p95)", |r: &ScaleResult| r.keystroke_p95_us),
        ("Keystroke (p99)", |r: &ScaleResult| r.keystroke_p99_us),
    ];
    for (label, getter) in &rows {
        print!("| {:col0$}", label);
        for (_, r) in &results {
            print!("| {:>colw$}", format_duration_us(getter(r)));
        }
        println!("|");
    }

    print!("| {:col0$}", "Candidates");
    for (_, r) in &results {
        print!("| {:>colw$}", r.candidates);
    }
    println!("|");

    println!();
}
