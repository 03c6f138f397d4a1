use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::NaiveDate;
use clubreg_core::TeamId;
use clubreg_invoicing::{DivisionPricing, PricingSchedule};
use clubreg_registration::{EditSession, RegistrationEditEngine, RegistrationSnapshot};
use clubreg_teams::{RawMember, TeamDraft, TeamEntry, group_by_division, normalize_roster};
use rust_decimal::Decimal;

const DIVISIONS: [&str; 4] = ["Open", "Masters", "Youth", "Mixed"];

fn roster(size: usize) -> Vec<RawMember> {
    (0..size)
        .map(|i| RawMember {
            name: Some(format!("Member {i}")),
            ..RawMember::default()
        })
        .collect()
}

fn pricing() -> PricingSchedule {
    let divisions = DIVISIONS
        .iter()
        .enumerate()
        .map(|(i, name)| DivisionPricing::new(*name, Decimal::from(100 + 10 * i as i64)));
    PricingSchedule::new(divisions).unwrap()
}

/// Baseline with `team_count` original teams spread over the divisions.
fn setup_engine(team_count: usize) -> RegistrationEditEngine {
    let teams = (0..team_count).map(|i| {
        TeamEntry::new(
            TeamId::new(format!("team-{i}")),
            format!("Team {i}"),
            DIVISIONS[i % DIVISIONS.len()],
        )
        .with_members(normalize_roster(roster(12), "Athlete"))
    });
    let baseline = RegistrationSnapshot::first_submission(
        "REG-001",
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        group_by_division(teams),
        &pricing(),
        Decimal::new(15, 2),
    );
    RegistrationEditEngine::new(baseline, pricing())
}

/// Withdraw every third team, edit every fifth roster and add `team_count / 4`
/// new teams.
fn busy_session(engine: &RegistrationEditEngine, team_count: usize) -> EditSession {
    let mut session = EditSession::new();
    for i in (0..team_count).step_by(3) {
        engine
            .remove_team(&mut session, &TeamId::new(format!("team-{i}")))
            .unwrap();
    }
    for i in (1..team_count).step_by(5) {
        let _ = engine.save_roster(&mut session, &TeamId::new(format!("team-{i}")), roster(15));
    }
    for i in 0..team_count / 4 {
        engine
            .add_team(
                &mut session,
                TeamDraft::new(format!("new-{i}"), format!("New {i}"), DIVISIONS[i % DIVISIONS.len()])
                    .with_members(roster(8)),
            )
            .unwrap();
    }
    session
}

fn bench_edit_mode_invoice(c: &mut Criterion) {
    let mut group = c.benchmark_group("edit_mode_invoice");

    for team_count in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*team_count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(team_count), team_count, |b, &team_count| {
            let engine = setup_engine(team_count);
            let session = busy_session(&engine, team_count);
            b.iter(|| black_box(engine.edit_mode_invoice(black_box(&session))));
        });
    }

    group.finish();
}

fn bench_merged_teams(c: &mut Criterion) {
    let mut group = c.benchmark_group("merged_teams_by_division");

    for team_count in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(team_count), team_count, |b, &team_count| {
            let engine = setup_engine(team_count);
            let session = busy_session(&engine, team_count);
            b.iter(|| black_box(engine.merged_teams_by_division(black_box(&session))));
        });
    }

    group.finish();
}

fn bench_bulk_import(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_import");

    for batch_size in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*batch_size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(batch_size), batch_size, |b, &batch_size| {
            let engine = setup_engine(100);
            // Half the batch collides with original teams.
            let drafts: Vec<TeamDraft> = (0..batch_size)
                .map(|i| {
                    let id = if i % 2 == 0 { format!("team-{}", i % 100) } else { format!("import-{i}") };
                    TeamDraft::new(id, format!("Import {i}"), "Open").with_members(roster(10))
                })
                .collect();
            b.iter(|| {
                let mut session = EditSession::new();
                black_box(engine.bulk_import(&mut session, drafts.clone()).unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_edit_mode_invoice,
    bench_merged_teams,
    bench_bulk_import
);
criterion_main!(benches);
