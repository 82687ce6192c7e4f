use std::env;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();

    generate_job_maps(&out_dir);
    generate_auto_attack_set(&out_dir);

    println!("cargo:rerun-if-changed=data/jobs.csv");
    println!("cargo:rerun-if-changed=data/auto_attacks.json");
}

struct JobRow {
    id: u8,
    abbreviation: String,
    log_name: String,
    role: String,
}

fn read_jobs() -> Vec<JobRow> {
    let csv = fs::read_to_string("data/jobs.csv").expect("failed to read jobs.csv");

    let mut rows = Vec::new();
    for line in csv.lines().skip(1) {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < 4 {
            continue;
        }
        let id: u8 = match fields[0].parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        rows.push(JobRow {
            id,
            abbreviation: fields[1].to_string(),
            log_name: fields[2].to_string(),
            role: fields[3].to_string(),
        });
    }
    rows
}

fn generate_job_maps(out_dir: &str) {
    let jobs = read_jobs();

    let path = Path::new(out_dir).join("jobs.rs");
    let mut file = BufWriter::new(fs::File::create(&path).unwrap());

    let quoted: Vec<_> = jobs
        .iter()
        .map(|j| (j.id, format!("\"{}\"", j.abbreviation), format!("\"{}\"", j.role)))
        .collect();
    let ids: Vec<_> = jobs.iter().map(|j| j.id.to_string()).collect();

    let mut abbreviations = phf_codegen::Map::new();
    for (id, abbr, _) in &quoted {
        abbreviations.entry(*id, abbr);
    }
    writeln!(
        file,
        "pub static JOB_ABBREVIATIONS: phf::Map<u8, &'static str> = {};",
        abbreviations.build()
    )
    .unwrap();

    let mut roles = phf_codegen::Map::new();
    for (id, _, role) in &quoted {
        roles.entry(*id, role);
    }
    writeln!(file, "pub static JOB_ROLES: phf::Map<u8, &'static str> = {};", roles.build())
        .unwrap();

    let mut by_log_name = phf_codegen::Map::new();
    for (job, id) in jobs.iter().zip(&ids) {
        by_log_name.entry(job.log_name.as_str(), id);
    }
    writeln!(
        file,
        "pub static JOB_IDS_BY_LOG_NAME: phf::Map<&'static str, u8> = {};",
        by_log_name.build()
    )
    .unwrap();

    let mut by_abbreviation = phf_codegen::Map::new();
    for (job, id) in jobs.iter().zip(&ids) {
        by_abbreviation.entry(job.abbreviation.as_str(), id);
    }
    writeln!(
        file,
        "pub static JOB_IDS_BY_ABBREVIATION: phf::Map<&'static str, u8> = {};",
        by_abbreviation.build()
    )
    .unwrap();
}

fn generate_auto_attack_set(out_dir: &str) {
    let json =
        fs::read_to_string("data/auto_attacks.json").expect("failed to read auto_attacks.json");

    // Simple JSON object parse: extract all numeric keys
    let mut ids: Vec<u32> = json
        .split('"')
        .enumerate()
        .filter_map(|(i, s)| if i % 2 == 1 { s.parse::<u32>().ok() } else { None })
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let path = Path::new(out_dir).join("auto_attacks.rs");
    let mut file = BufWriter::new(fs::File::create(&path).unwrap());

    let mut builder = phf_codegen::Set::new();
    for id in &ids {
        builder.entry(*id);
    }

    writeln!(file, "pub static AUTO_ATTACK_ABILITIES: phf::Set<u32> = {};", builder.build())
        .unwrap();
}
