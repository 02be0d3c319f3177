//! Implementation of the `sprout new` command.
//!
//! Responsibility: translate CLI arguments into a `GenerateRequest`, pick the
//! template, call the core generate service, and display results.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, instrument};

use sprout_adapters::{FilesystemExtractor, LocalFilesystem, PlaceholderRenderer, register_git_resolvers};
use sprout_core::{
    application::{
        AnswerResolver, ApplicationError, GenerateReport, GenerateRequest, GenerateService,
    },
    domain::{AnswerMap, DefaultResolverRegistry, RepositoryRef, TemplateSource},
};

use crate::{
    cli::NewArgs,
    commands::{configured_ttl, repository_cache},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `sprout new` command.
///
/// Dispatch sequence:
/// 1. Resolve repository, branch and answers from flags and config
/// 2. Refuse an existing explicit output directory before cloning
/// 3. Fetch the repository (spinner while cloning)
/// 4. Pick the template and generate into the output directory
/// 5. Print the summary
#[instrument(skip_all, fields(repo = ?args.repo, template = ?args.template))]
pub fn execute(
    args: NewArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let url = args
        .repo
        .clone()
        .or_else(|| config.defaults.repository.clone())
        .ok_or(CliError::MissingRepository)?;
    let branch = args.branch.clone().or_else(|| config.defaults.branch.clone());
    let repository = RepositoryRef::new(url, branch);
    let selection_root = args.path.clone().or_else(|| config.defaults.path.clone());

    let answers = parse_overrides(&args.set, &args.answers)?;
    let interactive = is_interactive(&args);
    let ttl = resolve_ttl(&args, &config)?;
    let use_cache = !args.no_cache && config.cache.enabled;

    debug!(
        repository = %repository,
        answers = answers.len(),
        interactive,
        use_cache,
        ttl_secs = ttl.map(|t| t.as_secs()),
        "Request resolved"
    );

    if let Some(out) = &args.output {
        ensure_output_free(out, args.force)?;
    }

    let service = build_service(&config, ttl, interactive);

    let spinner = output.spinner(&format!("Fetching {repository}"));
    let fetched = service.prepare(&repository, use_cache);
    spinner.finish_and_clear();
    let source = fetched?;

    let result = generate_from_source(
        &service,
        &source,
        &args,
        Generation {
            repository: &repository,
            selection_root: selection_root.as_deref(),
            answers,
            interactive,
            use_cache,
        },
        &output,
    );
    service.release(&source);
    let (template, report) = result?;

    info!(output = %report.output.display(), files = report.files_written, "Project generated");
    print_report(&template, &repository, &report, &output)
}

/// Per-request settings shared by template selection and generation.
struct Generation<'a> {
    repository: &'a RepositoryRef,
    selection_root: Option<&'a Path>,
    answers: AnswerMap,
    interactive: bool,
    use_cache: bool,
}

fn generate_from_source(
    service: &GenerateService,
    source: &TemplateSource,
    args: &NewArgs,
    generation: Generation<'_>,
    output: &OutputManager,
) -> CliResult<(String, GenerateReport)> {
    let names = service.list_templates(source, generation.selection_root, generation.repository)?;
    let template = choose_template(&names, args.template.as_deref(), generation.interactive)?;

    let target = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&template));
    ensure_output_free(&target, args.force)?;

    let mut request = GenerateRequest::new(generation.repository.clone(), target);
    request.sub_path = Some(match generation.selection_root {
        Some(root) => root.join(&template),
        None => PathBuf::from(&template),
    });
    request.answers = generation.answers;
    request.interactive = generation.interactive;
    request.overwrite = args.force;
    request.use_cache = generation.use_cache;

    output.header(&format!("Generating '{template}'..."))?;
    let report = service.generate_from(source, &request)?;
    Ok((template, report))
}

// ── Template selection ────────────────────────────────────────────────────────

/// Pick the template among `names` (sorted, non-empty).
pub fn choose_template(
    names: &[String],
    requested: Option<&str>,
    interactive: bool,
) -> CliResult<String> {
    if let Some(name) = requested {
        if names.iter().any(|n| n == name) {
            return Ok(name.to_owned());
        }
        return Err(template_not_found(name, names));
    }

    if let [only] = names {
        debug!(template = %only, "Single template auto-selected");
        return Ok(only.clone());
    }

    if interactive {
        return select_interactively(names);
    }

    Err(template_not_found("(none given)", names))
}

fn template_not_found(name: &str, names: &[String]) -> CliError {
    sprout_core::error::SproutError::from(ApplicationError::TemplateNotFound {
        name: name.to_owned(),
        available: names.to_vec(),
    })
    .into()
}

#[cfg(feature = "interactive")]
fn select_interactively(names: &[String]) -> CliResult<String> {
    Ok(crate::prompt::select_template(names)?)
}

#[cfg(not(feature = "interactive"))]
fn select_interactively(names: &[String]) -> CliResult<String> {
    Err(template_not_found("(none given)", names))
}

// ── Answers ───────────────────────────────────────────────────────────────────

/// Answers from `--set KEY=VALUE` and trailing `-- --KEY value` pairs.
///
/// A trailing `--KEY` with no value (end of input or followed by another
/// `--` token) is `true`. `--set` wins over a trailing pair for the same key.
pub fn parse_overrides(set: &[(String, String)], trailing: &[String]) -> CliResult<AnswerMap> {
    let mut answers = AnswerMap::new();
    let mut tokens = trailing.iter().peekable();

    while let Some(token) = tokens.next() {
        let key = token
            .strip_prefix("--")
            .filter(|k| !k.is_empty())
            .ok_or_else(|| CliError::InvalidInput {
                message: format!("unexpected answer argument '{token}', expected --KEY value"),
                source: None,
            })?;

        if let Some((key, value)) = key.split_once('=') {
            answers.insert(key, value);
            continue;
        }

        match tokens.next_if(|next| !next.starts_with("--")) {
            Some(value) => answers.insert(key, value.as_str()),
            None => answers.insert(key, true),
        };
    }

    for (key, value) in set {
        answers.insert(key.as_str(), value.as_str());
    }
    Ok(answers)
}

// ── Service wiring ────────────────────────────────────────────────────────────

fn is_interactive(args: &NewArgs) -> bool {
    cfg!(feature = "interactive") && !args.no_tty && std::io::stdin().is_terminal()
}

fn resolve_ttl(args: &NewArgs, config: &AppConfig) -> CliResult<Option<Duration>> {
    if args.no_ttl {
        return Ok(None);
    }
    match args.ttl {
        Some(ttl) => Ok(Some(ttl)),
        None => configured_ttl(config),
    }
}

fn ensure_output_free(path: &Path, force: bool) -> CliResult<()> {
    if path.exists() && !force {
        return Err(CliError::OutputExists {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn build_service(config: &AppConfig, ttl: Option<Duration>, interactive: bool) -> GenerateService {
    let mut defaults = DefaultResolverRegistry::with_builtin();
    register_git_resolvers(&mut defaults);

    let resolver = with_prompter(AnswerResolver::new(defaults), interactive);

    GenerateService::new(
        repository_cache(config, ttl),
        Box::new(FilesystemExtractor::new()),
        resolver,
        Box::new(PlaceholderRenderer::new()),
        Box::new(LocalFilesystem::new()),
    )
}

#[cfg(feature = "interactive")]
fn with_prompter(resolver: AnswerResolver, interactive: bool) -> AnswerResolver {
    if interactive {
        resolver.with_prompter(Box::new(crate::prompt::TerminalPrompter::new()))
    } else {
        resolver
    }
}

#[cfg(not(feature = "interactive"))]
fn with_prompter(resolver: AnswerResolver, _interactive: bool) -> AnswerResolver {
    resolver
}

// ── Report ────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Summary<'a> {
    repository: String,
    template: &'a str,
    output: &'a Path,
    cache_used: bool,
    files_written: usize,
    directories_created: usize,
    answers: &'a AnswerMap,
}

fn print_report(
    template: &str,
    repository: &RepositoryRef,
    report: &GenerateReport,
    output: &OutputManager,
) -> CliResult<()> {
    if output.is_json() {
        output.json(&Summary {
            repository: repository.to_string(),
            template,
            output: &report.output,
            cache_used: report.cache_used,
            files_written: report.files_written,
            directories_created: report.directories_created,
            answers: &report.answers,
        })?;
        return Ok(());
    }

    output.success(&format!(
        "Created '{}' from template '{template}'",
        report.output.display()
    ))?;
    output.info(&format!(
        "{} files, {} directories",
        report.files_written, report.directories_created
    ))?;
    if report.cache_used {
        output.info(&format!("Used cached checkout of {repository}"))?;
    }

    if !output.is_quiet() {
        output.print("")?;
        output.print("Next steps:")?;
        output.print(&format!("  cd {}", report.output.display()))?;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
