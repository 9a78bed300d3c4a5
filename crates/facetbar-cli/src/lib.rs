//! facetbar: command-line front end for the taxonomy facet filter.
//!
//! Reads a term file, prints the filter's display rows or admin form, or
//! applies a selection to a query and prints the rewritten query. Filter
//! settings come from `FACETBAR_*` environment variables, overridden by
//! flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facetbar_core::{FilterConfig, FilterController, FilterHooks, FilterType, Query, Selection};
use facetbar_store::InMemoryTermRepository;

#[derive(Debug, Parser)]
#[command(name = "facetbar")]
#[command(author, version, about = "Hierarchical taxonomy facet filter")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the display rows for a term file
    Values {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Apply a selection to a query and print the result
    Apply {
        #[command(flatten)]
        filter: FilterArgs,

        /// Query file to rewrite (default: an empty query)
        #[arg(short, long)]
        query: Option<PathBuf>,

        /// Selected value(s); term ids or comma-separated id lists
        #[arg(short, long, required = true, num_args = 1..)]
        select: Vec<String>,

        /// Treat the selection as a multi-select (no descendant expansion)
        #[arg(long)]
        multiselect: bool,

        /// Append the clause to the top level instead of a named group
        #[arg(long)]
        flat: bool,

        /// Relation operator for the merged clause
        #[arg(long, conflicts_with = "no_relation")]
        relation: Option<String>,

        /// Leave relation operators untouched
        #[arg(long)]
        no_relation: bool,

        /// Subject type of the query (default: the configured content type)
        #[arg(long)]
        subject_type: Option<String>,
    },

    /// Print the admin form markup
    Form {
        /// Filter title (default: FACETBAR_TITLE or "Festival")
        #[arg(long)]
        title: Option<String>,

        /// Show the multi-select option as chosen
        #[arg(long)]
        multiselect: bool,
    },
}

/// Options shared by commands that read terms.
#[derive(Debug, clap::Args)]
pub struct FilterArgs {
    /// Term file (JSON array of terms, or {"taxonomy", "terms"})
    #[arg(short, long)]
    pub terms: PathBuf,

    /// Taxonomy to read (default: FACETBAR_TAXONOMY or "event_festival")
    #[arg(long)]
    pub taxonomy: Option<String>,

    /// Include terms nothing is tagged with
    #[arg(long)]
    pub show_empty: bool,
}

impl FilterArgs {
    fn config(&self, base: FilterConfig) -> FilterConfig {
        let mut config = match &self.taxonomy {
            Some(taxonomy) => base.with_taxonomy(taxonomy.clone()),
            None => base,
        };
        if self.show_empty {
            config.hide_empty = false;
        }
        config
    }

    fn repository(&self) -> Result<InMemoryTermRepository> {
        InMemoryTermRepository::from_json_file(&self.terms)
            .with_context(|| format!("Failed to load terms from {}", self.terms.display()))
    }
}

/// Run a parsed command against `base` configuration and return what it
/// prints.
pub fn run(cli: &Cli, base: FilterConfig) -> Result<String> {
    match &cli.command {
        Commands::Values { filter } => cmd_values(filter, base),
        Commands::Apply {
            filter,
            query,
            select,
            multiselect,
            flat,
            relation,
            no_relation,
            subject_type,
        } => {
            let mut config = filter.config(base);
            if *multiselect {
                config = config.with_filter_type(FilterType::MultiSelect);
            }

            let mut hooks = FilterHooks::new();
            if *flat {
                hooks = hooks.with_nested_merge(|| false);
            }
            if *no_relation {
                hooks = hooks.with_relation(|| None);
            } else if let Some(relation) = relation.clone() {
                hooks = hooks.with_relation(move || Some(relation.clone()));
            }

            let mut query = match query {
                Some(path) => read_query(path)?,
                None => Query::new(config.content_type.clone()),
            };
            if let Some(subject_type) = subject_type {
                query.subject_type = subject_type.clone();
            }

            let mut controller =
                FilterController::new(filter.repository()?, config).with_hooks(hooks);
            controller.bind_selection(Selection::new(select.iter().cloned()));

            let query = controller.apply_to_query(query);
            Ok(serde_json::to_string_pretty(&query)?)
        }
        Commands::Form { title, multiselect } => {
            let mut config = base;
            if let Some(title) = title {
                config = config.with_title(title.clone());
            }
            if *multiselect {
                config = config.with_filter_type(FilterType::MultiSelect);
            }
            let controller = FilterController::new(InMemoryTermRepository::default(), config);
            Ok(controller.admin_form())
        }
    }
}

fn cmd_values(filter: &FilterArgs, base: FilterConfig) -> Result<String> {
    let controller = FilterController::new(filter.repository()?, filter.config(base));
    let rows = controller.display_values();
    tracing::info!(
        subsystem = "cli",
        op = "values",
        taxonomy = %controller.config().taxonomy,
        row_count = rows.len(),
        "Display values computed"
    );
    Ok(serde_json::to_string_pretty(&rows)?)
}

fn read_query(path: &Path) -> Result<Query> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read query from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse query in {}", path.display()))
}
