use crate::infra::InMemoryInterviewRepository;
use crate::render::{render_progress, render_report, render_rubric};
use clap::Args;
use interview_assessor::assessment::{
    load_rubric_file, parse_rubric, AssessmentService, CandidateProfile, DirectoryRubricSource,
    ReplayJudge, ReplayStep, RubricCatalog, RubricError, RubricFormat, ScoringEngine,
    ScoringPolicy, StaticRubricSource,
};
use interview_assessor::config::AppConfig;
use interview_assessor::error::AppError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

const DEMO_RUBRIC: &str = include_str!("../../../templates/backend-engineer-assessment.yaml");
const DEMO_TRANSCRIPT: &str = include_str!("../../../demos/backend-engineer-transcript.json");

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Path to a YAML or JSON rubric template
    #[arg(required_unless_present = "template", conflicts_with = "template")]
    pub(crate) path: Option<PathBuf>,
    /// Template id looked up in ASSESSOR_TEMPLATE_DIRS
    #[arg(long)]
    pub(crate) template: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ReplayArgs {
    /// Rubric template file used to score the interview
    #[arg(long, conflicts_with = "template")]
    pub(crate) rubric: Option<PathBuf>,
    /// Template id looked up in ASSESSOR_TEMPLATE_DIRS; defaults to the transcript's template
    #[arg(long)]
    pub(crate) template: Option<String>,
    /// Recorded interview (JSON) with questions, answers and judge outcomes
    #[arg(long)]
    pub(crate) transcript: PathBuf,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

/// A finished interview as captured from a live run, judge outcomes included.
#[derive(Debug, Deserialize)]
pub(crate) struct RecordedInterview {
    #[serde(default)]
    pub(crate) template_id: Option<String>,
    pub(crate) candidate: CandidateProfile,
    pub(crate) turns: Vec<RecordedTurn>,
    #[serde(default)]
    pub(crate) follow_ups: BTreeMap<String, String>,
    #[serde(default)]
    pub(crate) summary: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordedTurn {
    #[serde(default)]
    pub(crate) question: String,
    pub(crate) answer: String,
    pub(crate) outcome: ReplayStep,
}

/// Catalog over the configured template directories.
fn directory_catalog(config: &AppConfig) -> RubricCatalog {
    RubricCatalog::new(DirectoryRubricSource::new(
        config.assessment.template_dirs.clone(),
    ))
}

/// Parses a rubric file and serves it under its declared template id.
fn file_catalog(path: &Path) -> Result<(RubricCatalog, String), AppError> {
    let text = std::fs::read_to_string(path)?;
    let format = RubricFormat::from_path(path);
    let template_id = parse_rubric(&text, format)?.template_id().to_string();
    let catalog = RubricCatalog::new(StaticRubricSource::new().with_document(
        template_id.clone(),
        text,
        format,
    ));
    Ok((catalog, template_id))
}

pub(crate) fn validate_rubric(config: &AppConfig, args: ValidateArgs) -> Result<(), AppError> {
    match (args.path, args.template) {
        (Some(path), _) => render_rubric(&load_rubric_file(&path)?),
        (None, Some(template_id)) => render_rubric(&*directory_catalog(config).load(&template_id)?),
        (None, None) => return Err(RubricError::MissingTemplateId.into()),
    }
    Ok(())
}

pub(crate) async fn run_replay(config: &AppConfig, args: ReplayArgs) -> Result<(), AppError> {
    let ReplayArgs {
        rubric,
        template,
        transcript,
        json,
    } = args;

    let recorded: RecordedInterview = serde_json::from_str(&std::fs::read_to_string(transcript)?)?;
    let (catalog, template_id) = match rubric {
        Some(path) => file_catalog(&path)?,
        None => {
            let template_id = template
                .or_else(|| recorded.template_id.clone())
                .ok_or(RubricError::MissingTemplateId)?;
            (directory_catalog(config), template_id)
        }
    };
    replay(config, Arc::new(catalog), &template_id, recorded, json).await
}

pub(crate) async fn run_demo(config: &AppConfig, args: DemoArgs) -> Result<(), AppError> {
    let recorded: RecordedInterview = serde_json::from_str(DEMO_TRANSCRIPT)?;
    if !args.json {
        println!("Interview assessment demo");
        println!("Replaying a recorded backend engineer interview\n");
    }
    let template_id = parse_rubric(DEMO_RUBRIC, RubricFormat::Yaml)?
        .template_id()
        .to_string();
    let catalog = RubricCatalog::new(StaticRubricSource::new().with_document(
        template_id.clone(),
        DEMO_RUBRIC,
        RubricFormat::Yaml,
    ));
    replay(config, Arc::new(catalog), &template_id, recorded, args.json).await
}

async fn replay(
    config: &AppConfig,
    catalog: Arc<RubricCatalog>,
    template_id: &str,
    recorded: RecordedInterview,
    json: bool,
) -> Result<(), AppError> {
    if let Some(recorded_id) = recorded.template_id.as_deref() {
        if recorded_id != template_id {
            warn!(
                recorded = recorded_id,
                rubric = template_id,
                "transcript was recorded against a different template"
            );
        }
    }

    let judge = recorded.follow_ups.into_iter().fold(
        ReplayJudge::new(recorded.turns.iter().map(|turn| turn.outcome.clone())),
        |judge, (dimension, question)| judge.with_follow_up(dimension, question),
    );
    let judge = match recorded.summary {
        Some(summary) => judge.with_summary(summary),
        None => judge,
    };
    let repository = Arc::new(InMemoryInterviewRepository::default());
    let service = AssessmentService::new(
        catalog,
        Arc::clone(&repository),
        Arc::new(judge),
        ScoringEngine::new(ScoringPolicy::from(&config.assessment)),
    );

    let id = service
        .create_interview(template_id, recorded.candidate)?
        .id;
    service.start(&id).await?;
    for turn in &recorded.turns {
        if !turn.question.trim().is_empty() {
            service.record_question(&id, &turn.question).await?;
        }
        let outcome = service.submit_answer(&id, &turn.answer).await?;
        if !json {
            render_progress(&outcome);
        }
    }

    let report = service.complete(&id).await?;
    info!(
        interview_id = %id,
        stored_reports = repository.report_count(),
        "replay finished"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(report.as_ref())?);
    } else {
        render_report(&report);
    }
    Ok(())
}
