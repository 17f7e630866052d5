//! Command handlers.
//!
//! Each handler builds the core service it needs over the shared
//! connection and returns rendered output for `main` to print.

use anyhow::Context;
use chorekeeper_core::repo::assignment_repo::{DayBoardEntry, SqliteAssignmentRepository};
use chorekeeper_core::repo::chore_repo::SqliteChoreRepository;
use chorekeeper_core::repo::person_repo::SqlitePersonRepository;
use chorekeeper_core::repo::report_repo::{
    family_summary, individual_summary, totals, DailySummary, IndividualSummary, SummaryTotals,
};
use chorekeeper_core::repo::review_repo::{ReviewQueueEntry, SqliteReviewRepository};
use chorekeeper_core::service::chore_service::parse_recurrence_input;
use chorekeeper_core::{
    generate_recurring_assignments, AssignmentService, Chore, ChoreService, DateRange,
    GenerationReport, HouseholdService, NewChore, NewCompletion, NewPerson, NewReview, Recurrence,
    ReviewService,
};
use chrono::NaiveDate;
use log::info;
use rusqlite::Connection;
use serde::Serialize;

use crate::cli::{
    AssignArgs, ChoreAddArgs, ChoreCommand, Commands, CompleteArgs, DayArgs, GenerateArgs,
    OutputFormat, PersonCommand, QueueArgs, RangeArgs, ReportCommand, ReviewArgs,
};
use crate::config::GenerationConfig;
use crate::output::{lines, opt, render};

/// Per-invocation settings shared by all handlers.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub format: OutputFormat,
    pub generation: GenerationConfig,
    /// Default for every omitted date argument.
    pub today: NaiveDate,
}

#[derive(Debug, Serialize)]
struct CountResult {
    date: NaiveDate,
    count: usize,
}

#[derive(Debug, Serialize)]
struct SummaryReport<T> {
    days: Vec<T>,
    totals: SummaryTotals,
}

pub fn dispatch(command: Commands, conn: &mut Connection, ctx: &RunContext) -> anyhow::Result<String> {
    match command {
        Commands::Person { action } => person(action, conn, ctx),
        Commands::Chore { action } => chore(action, conn, ctx),
        Commands::Assign(args) => assign(args, conn, ctx),
        Commands::Board(args) => board(args, conn, ctx),
        Commands::CopyPrevious(args) => copy_previous(args, conn, ctx),
        Commands::Clear(args) => clear(args, conn, ctx),
        Commands::Generate(args) => generate(args, conn, ctx),
        Commands::Complete(args) => complete(args, conn, ctx),
        Commands::Review(args) => review(args, conn, ctx),
        Commands::Queue(args) => queue(args, conn, ctx),
        Commands::Report { action } => report(action, conn, ctx),
    }
}

fn person(action: PersonCommand, conn: &Connection, ctx: &RunContext) -> anyhow::Result<String> {
    let household = HouseholdService::new(SqlitePersonRepository::new(conn));
    match action {
        PersonCommand::Add { name, role } => {
            let person = household.add_person(&NewPerson::new(name, role.into()))?;
            render(&person, ctx.format, |p| {
                format!("added person {} {} ({})", p.id, p.name, p.role.as_str())
            })
        }
        PersonCommand::List => {
            let people = household.list_people()?;
            render(&people, ctx.format, |people| {
                lines(people, "no people yet", |p| {
                    format!("{}\t{}\t{}", p.id, p.name, p.role.as_str())
                })
            })
        }
    }
}

fn chore(action: ChoreCommand, conn: &Connection, ctx: &RunContext) -> anyhow::Result<String> {
    let service = ChoreService::new(SqliteChoreRepository::new(conn));
    match action {
        ChoreCommand::Add(args) => add_chore(&service, args, ctx),
        ChoreCommand::List { recurring, kind } => {
            let chores = if recurring || kind.is_some() {
                service.list_recurring_chores(kind)?
            } else {
                service.list_chores()?
            };
            render(&chores, ctx.format, |chores| {
                lines(chores, "no chores yet", chore_line)
            })
        }
        ChoreCommand::Recurrence {
            chore_id,
            kind,
            days,
            off,
        } => {
            let chore = service.update_recurrence_settings(
                chore_id,
                !off,
                kind.as_deref(),
                days.as_deref(),
            )?;
            render(&chore, ctx.format, |c| {
                format!(
                    "chore {} recurrence: {}",
                    c.id,
                    describe_recurrence(c.recurrence.as_ref())
                )
            })
        }
    }
}

fn add_chore(
    service: &ChoreService<SqliteChoreRepository<'_>>,
    args: ChoreAddArgs,
    ctx: &RunContext,
) -> anyhow::Result<String> {
    let recurrence = parse_recurrence_input(
        args.recurrence.is_some(),
        args.recurrence.as_deref(),
        args.days.as_deref(),
    )?;
    let chore = service.create_chore(&NewChore {
        room: args.room,
        task: args.task,
        frequency: args.frequency,
        estimated_minutes: args.minutes,
        recurrence,
    })?;
    render(&chore, ctx.format, |c| format!("added chore {}", chore_line(c)))
}

fn assign(args: AssignArgs, conn: &Connection, ctx: &RunContext) -> anyhow::Result<String> {
    let service = AssignmentService::new(SqliteAssignmentRepository::new(conn));
    let date = args.date.unwrap_or(ctx.today);
    let assignment = service.assign_chore(args.chore_id, args.person_id, date, args.due)?;
    render(&assignment, ctx.format, |a| {
        format!(
            "assignment {}: chore {} -> person {} on {} (due {})",
            a.id,
            a.chore_id,
            a.person_id,
            a.assigned_date,
            opt(a.due_date)
        )
    })
}

fn board(args: DayArgs, conn: &Connection, ctx: &RunContext) -> anyhow::Result<String> {
    let date = args.date.unwrap_or(ctx.today);
    let entries = AssignmentService::new(SqliteAssignmentRepository::new(conn)).day_board(date)?;
    render(&entries, ctx.format, |entries| {
        lines(entries, &format!("nothing assigned on {date}"), board_line)
    })
}

fn copy_previous(args: DayArgs, conn: &Connection, ctx: &RunContext) -> anyhow::Result<String> {
    let date = args.date.unwrap_or(ctx.today);
    let count = AssignmentService::new(SqliteAssignmentRepository::new(conn))
        .copy_from_previous_day(date)?;
    render(&CountResult { date, count }, ctx.format, |r| {
        format!("copied {} assignment(s) onto {}", r.count, r.date)
    })
}

fn clear(args: DayArgs, conn: &Connection, ctx: &RunContext) -> anyhow::Result<String> {
    let date = args.date.unwrap_or(ctx.today);
    let count = AssignmentService::new(SqliteAssignmentRepository::new(conn)).clear_day(date)?;
    render(&CountResult { date, count }, ctx.format, |r| {
        format!("removed {} assignment(s) from {}", r.count, r.date)
    })
}

fn generate(args: GenerateArgs, conn: &mut Connection, ctx: &RunContext) -> anyhow::Result<String> {
    let start = args.date.unwrap_or(ctx.today);
    let range = DateRange::new(start, args.through.unwrap_or(start))
        .context("invalid generation range")?;
    let kind = args.strategy.unwrap_or(ctx.generation.strategy);
    let mut strategy = kind.build(args.seed.or(ctx.generation.seed));
    info!(
        "event=generate_command module=cli status=start from={} to={} strategy={}",
        range.start(),
        range.end(),
        kind
    );

    let mut reports: Vec<GenerationReport> = Vec::new();
    for day in range
        .start()
        .iter_days()
        .take_while(|day| *day <= range.end())
    {
        let report = generate_recurring_assignments(conn, &mut strategy, day)
            .with_context(|| format!("generation failed for {day}"))?;
        reports.push(report);
    }

    render(reports.as_slice(), ctx.format, |reports| {
        lines(reports, "no days generated", |r| {
            let mut line = format!(
                "{}: created {} of {} due ({} already assigned, {} without assignee)",
                r.target_date, r.created, r.due_chores, r.already_assigned, r.skipped_without_assignee
            );
            if r.skipped_invalid > 0 {
                line.push_str(&format!(
                    "; {} chore(s) with unusable settings skipped",
                    r.skipped_invalid
                ));
            }
            line
        })
    })
}

fn complete(args: CompleteArgs, conn: &Connection, ctx: &RunContext) -> anyhow::Result<String> {
    let completion = review_service(conn).complete_assignment(&NewCompletion {
        assignment_id: args.assignment_id,
        actual_minutes: args.minutes,
        notes: args.notes,
        photo_filename: args.photo,
    })?;
    render(&completion, ctx.format, |c| {
        format!(
            "completion {} recorded for assignment {} ({} min)",
            c.id, c.assignment_id, c.actual_minutes
        )
    })
}

fn review(args: ReviewArgs, conn: &Connection, ctx: &RunContext) -> anyhow::Result<String> {
    let review = review_service(conn).review_completion(&NewReview {
        completion_id: args.completion_id,
        reviewer_id: args.reviewer,
        approved: args.approve && !args.reject,
        review_notes: args.notes,
    })?;
    render(&review, ctx.format, |r| {
        format!(
            "completion {} {} by person {}",
            r.completion_id,
            if r.approved { "approved" } else { "rejected" },
            r.reviewer_id
        )
    })
}

fn queue(args: QueueArgs, conn: &Connection, ctx: &RunContext) -> anyhow::Result<String> {
    let range = resolve_range(&args.range, ctx.today)?;
    let entries = review_service(conn).review_queue(&range, args.all)?;
    render(&entries, ctx.format, |entries| {
        lines(entries, "nothing to review", queue_line)
    })
}

fn report(action: ReportCommand, conn: &Connection, ctx: &RunContext) -> anyhow::Result<String> {
    match action {
        ReportCommand::Family(range) => {
            let range = resolve_range(&range, ctx.today)?;
            let days = family_summary(conn, &range)?;
            let totals = totals(days.iter().map(|d| (d.total_assigned, d.total_completed)));
            render(&SummaryReport { days, totals }, ctx.format, |r| {
                summary_text(&r.days, &r.totals, family_line)
            })
        }
        ReportCommand::Person { person_id, range } => {
            let range = resolve_range(&range, ctx.today)?;
            let days = individual_summary(conn, person_id, &range)?;
            let totals = totals(days.iter().map(|d| (d.assigned, d.completed)));
            render(&SummaryReport { days, totals }, ctx.format, |r| {
                summary_text(&r.days, &r.totals, individual_line)
            })
        }
    }
}

fn review_service(
    conn: &Connection,
) -> ReviewService<SqliteReviewRepository<'_>, SqlitePersonRepository<'_>> {
    ReviewService::new(
        SqliteReviewRepository::new(conn),
        SqlitePersonRepository::new(conn),
    )
}

/// `--from`/`--to` with a seven-day window ending today by default.
fn resolve_range(args: &RangeArgs, today: NaiveDate) -> anyhow::Result<DateRange> {
    let end = args.to.unwrap_or(today);
    match args.from {
        Some(start) => DateRange::new(start, end).context("invalid date range"),
        None => Ok(DateRange::ending_on(end, 7)),
    }
}

fn describe_recurrence(recurrence: Option<&Recurrence>) -> String {
    match recurrence {
        None => "one-off".to_string(),
        Some(rule) => match rule.days_string() {
            Some(days) => format!("{} {}", rule.kind(), days),
            None => rule.kind().to_string(),
        },
    }
}

fn chore_line(chore: &Chore) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}m\t{}",
        chore.id,
        chore.room,
        chore.task,
        chore.frequency,
        chore.estimated_minutes,
        describe_recurrence(chore.recurrence.as_ref())
    )
}

fn board_line(entry: &DayBoardEntry) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        entry.assignment_id,
        opt(entry.due_date),
        entry.room,
        entry.task,
        entry.assignee,
        entry.status().as_str()
    )
}

fn queue_line(entry: &ReviewQueueEntry) -> String {
    let verdict = match entry.approved {
        None => "unreviewed",
        Some(true) => "approved",
        Some(false) => "rejected",
    };
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}m\t{}",
        entry.completion_id,
        entry.assigned_date,
        entry.room,
        entry.task,
        entry.completed_by,
        entry.actual_minutes,
        verdict
    )
}

fn family_line(day: &DailySummary) -> String {
    format!(
        "{}\t{}/{}\t{:.1}%",
        day.date, day.total_completed, day.total_assigned, day.completion_rate
    )
}

fn individual_line(day: &IndividualSummary) -> String {
    format!(
        "{}\t{}\t{}/{}\t{:.1}%\t{}m est\t{}m actual",
        day.date,
        day.person_name,
        day.completed,
        day.assigned,
        day.completion_rate,
        day.estimated_minutes,
        day.actual_minutes
    )
}

fn summary_text<T>(days: &[T], totals: &SummaryTotals, line: impl Fn(&T) -> String) -> String {
    let mut text = lines(days, "no assignments in range", line);
    text.push_str(&format!(
        "\ntotal\t{}/{}\t{:.1}%",
        totals.completed, totals.assigned, totals.completion_rate
    ));
    text
}

#[cfg(test)]
mod tests {
    use super::{dispatch, RunContext};
    use crate::cli::{Cli, OutputFormat};
    use crate::config::GenerationConfig;
    use chorekeeper_core::open_db_in_memory;
    use chorekeeper_core::StrategyKind;
    use chrono::NaiveDate;
    use clap::Parser;
    use rusqlite::Connection;
    use serde_json::Value;

    fn context(format: OutputFormat) -> RunContext {
        RunContext {
            format,
            generation: GenerationConfig {
                strategy: StrategyKind::RoundRobin,
                seed: None,
            },
            // Monday
            today: NaiveDate::from_ymd_opt(2026, 10, 12).unwrap(),
        }
    }

    fn run(conn: &mut Connection, format: OutputFormat, args: &[&str]) -> String {
        let cli = Cli::try_parse_from(std::iter::once("chorekeeper").chain(args.iter().copied()))
            .unwrap();
        dispatch(cli.command, conn, &context(format)).unwrap()
    }

    fn json(conn: &mut Connection, args: &[&str]) -> Value {
        serde_json::from_str(&run(conn, OutputFormat::Json, args)).unwrap()
    }

    #[test]
    fn household_setup_and_generation_round_trip() {
        let mut conn = open_db_in_memory().unwrap();
        json(&mut conn, &["person", "add", "Alice"]);
        json(&mut conn, &["person", "add", "Bob"]);
        let chore = json(
            &mut conn,
            &[
                "chore", "add", "--room", "Kitchen", "--task", "Dishes", "--minutes", "15",
                "--recurrence", "daily",
            ],
        );
        assert_eq!(chore["recurrence"]["kind"], "daily");
        json(
            &mut conn,
            &[
                "chore", "add", "--room", "Hall", "--task", "Vacuum", "--minutes", "20",
                "--recurrence", "weekly",
            ],
        );

        let reports = json(&mut conn, &["generate", "--through", "2026-10-13"]);
        assert_eq!(reports.as_array().unwrap().len(), 2);
        assert_eq!(reports[0]["created"], 2);
        assert_eq!(reports[1]["created"], 1);

        let board = run(&mut conn, OutputFormat::Text, &["board"]);
        assert_eq!(board.lines().count(), 2);
        assert!(board.contains("pending"));
    }

    #[test]
    fn completion_and_review_flow_through_commands() {
        let mut conn = open_db_in_memory().unwrap();
        let parent = json(&mut conn, &["person", "add", "Robin", "--role", "parent"]);
        let child = json(&mut conn, &["person", "add", "Sam"]);
        json(
            &mut conn,
            &["chore", "add", "--room", "Yard", "--task", "Rake", "--minutes", "30"],
        );
        let assignment = json(
            &mut conn,
            &["assign", "1", &child["id"].to_string()],
        );
        assert_eq!(assignment["due_date"], "2026-10-12");

        let completion = json(
            &mut conn,
            &[
                "complete",
                &assignment["id"].to_string(),
                "--minutes",
                "25",
                "--photo",
                "yard.jpg",
            ],
        );
        let queue = json(&mut conn, &["queue"]);
        assert_eq!(queue.as_array().unwrap().len(), 1);

        let review = run(
            &mut conn,
            OutputFormat::Text,
            &[
                "review",
                &completion["id"].to_string(),
                "--reviewer",
                &parent["id"].to_string(),
                "--approve",
            ],
        );
        assert!(review.contains("approved"));
        assert_eq!(run(&mut conn, OutputFormat::Text, &["queue"]), "nothing to review");

        let report = run(&mut conn, OutputFormat::Text, &["report", "family"]);
        assert!(report.contains("2026-10-12\t1/1\t100.0%"));
    }

    #[test]
    fn child_reviewer_is_refused() {
        let mut conn = open_db_in_memory().unwrap();
        json(&mut conn, &["person", "add", "Sam"]);
        json(
            &mut conn,
            &["chore", "add", "--room", "Yard", "--task", "Rake", "--minutes", "30"],
        );
        json(&mut conn, &["assign", "1", "1"]);
        json(&mut conn, &["complete", "1", "--minutes", "10"]);

        let cli = Cli::try_parse_from([
            "chorekeeper", "review", "1", "--reviewer", "1", "--reject",
        ])
        .unwrap();
        let err = dispatch(cli.command, &mut conn, &context(OutputFormat::Text)).unwrap_err();
        assert!(err.to_string().contains("not a parent"));
    }

    #[test]
    fn inverted_generation_range_is_rejected() {
        let mut conn = open_db_in_memory().unwrap();
        let cli = Cli::try_parse_from([
            "chorekeeper",
            "generate",
            "--date",
            "2026-10-12",
            "--through",
            "2026-10-01",
        ])
        .unwrap();
        assert!(dispatch(cli.command, &mut conn, &context(OutputFormat::Json)).is_err());
    }
}
