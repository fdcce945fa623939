use crate::{Command, ShellLine};
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use pmrview::api::types::{Exposure, ExposureInfo, PathTarget, TreeEntry, Workspace, WorkspaceInfo};
use pmrview::api::PmrClient;
use pmrview::config::Config;
use pmrview::files::{is_binary_file, is_markdown_file};
use pmrview::format::{format_date, format_file_count, format_number};
use pmrview::links::{archive_download_urls, combine_archive_url};
use pmrview::notification::Notification;
use pmrview::render::render_markdown;
use pmrview::search::{category_label, is_valid_term};
use pmrview::sort::{sort_entities, SortOption};
use pmrview::storage::{SessionStorage, SqliteStorage};
use pmrview::stores::{AuthStore, CategoryData, ExposureStore, SearchStore, WorkspaceStore};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tracing::info;

const NO_DESCRIPTION: &str = "(no description)";
const PROMPT: &str = "pmrview> ";

/// Main application state
pub struct App {
  config: Config,
  workspaces: WorkspaceStore<PmrClient>,
  exposures: ExposureStore<PmrClient>,
  search: SearchStore<PmrClient>,
  auth: AuthStore<PmrClient>,
  notification: Notification,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let client = PmrClient::new(&config.api)?;
    let storage: Arc<dyn SessionStorage> = Arc::new(SqliteStorage::open()?);

    // Restores the bearer token on the shared client before any request
    let auth = AuthStore::new(client.clone(), storage.clone());
    if auth.init_auth()? {
      info!(username = ?auth.username(), "restored session");
    }

    Ok(Self {
      workspaces: WorkspaceStore::new(client.clone(), config.cache.workspaces_ttl()?),
      exposures: ExposureStore::new(client.clone(), config.cache.exposures_ttl()?),
      search: SearchStore::new(client, config.search.kinds.clone(), config.cache.search_ttl()?),
      auth,
      notification: Notification::new(storage),
      config,
    })
  }

  pub async fn run(&self, command: Command) -> Result<()> {
    match command {
      Command::Workspaces { sort, refresh } => self.list_workspaces(sort, refresh).await,
      Command::Workspace {
        alias,
        commit,
        path,
      } => {
        self
          .show_workspace(&alias, commit.as_deref().unwrap_or(""), &path)
          .await
      }
      Command::File {
        alias,
        commit,
        path,
        render,
      } => self.show_file(&alias, &commit, &path, render).await,
      Command::Exposures { sort, refresh } => self.list_exposures(sort, refresh).await,
      Command::Exposure { alias } => self.show_exposure(&alias).await,
      Command::ExposureFile { alias, file } => self.show_exposure_file(&alias, &file).await,
      Command::View {
        exposure_id,
        file_id,
        view_key,
        path,
        raw,
      } => {
        self
          .show_view(exposure_id, file_id, &view_key, &path, raw)
          .await
      }
      Command::Search {
        kind,
        term,
        refresh,
      } => self.search(kind.as_deref(), term.as_deref(), refresh).await,
      Command::Login { user } => {
        let password = Config::get_password()?;
        self.auth.login(&user, &password).await?;
        println!("Signed in as {}", user);
        Ok(())
      }
      Command::Logout => {
        if !self.auth.is_authenticated() {
          println!("Not signed in");
          return Ok(());
        }
        self.auth.logout().await?;
        println!("Signed out");
        Ok(())
      }
      Command::Notice { dismiss } => self.notice(dismiss),
      Command::Shell => Err(eyre!("Already in an interactive shell")),
    }
  }

  /// Read commands from stdin until EOF or `quit`. Caches live as long as
  /// the shell, so `--refresh` matters here.
  pub async fn shell(&self) -> Result<()> {
    info!("interactive shell started");
    let mut lines = BufReader::new(stdin()).lines();

    loop {
      print!("{}", PROMPT);
      std::io::stdout()
        .flush()
        .map_err(|e| eyre!("Failed to write prompt: {}", e))?;

      let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| eyre!("Failed to read command: {}", e))?
      else {
        println!();
        break;
      };

      let words = match split_command_line(&line) {
        Ok(words) => words,
        Err(e) => {
          eprintln!("Error: {}", e);
          continue;
        }
      };
      match words.first().map(String::as_str) {
        None => continue,
        Some("quit" | "exit") => break,
        Some(_) => {}
      }

      let command = match ShellLine::try_parse_from(&words) {
        Ok(parsed) => parsed.command,
        Err(e) => {
          // Also covers --help, which clap reports as an error
          let _ = e.print();
          continue;
        }
      };
      if let Err(e) = self.run(command).await {
        eprintln!("Error: {}", e);
      }
    }

    info!("interactive shell finished");
    Ok(())
  }

  async fn list_workspaces(&self, sort: SortOption, refresh: bool) -> Result<()> {
    let workspaces = self.workspaces.fetch_workspaces(refresh).await?;
    println!(
      "{} - {} workspaces",
      self.config.display_title(),
      format_number(workspaces.len() as i64)
    );
    for workspace in sort_entities(&workspaces, sort) {
      println!("{}", workspace_line(&workspace));
    }
    Ok(())
  }

  async fn show_workspace(&self, alias: &str, commit: &str, path: &str) -> Result<()> {
    let info = self.workspaces.get_workspace_info(alias, commit, path).await?;
    for line in workspace_info_lines(alias, &info) {
      println!("{}", line);
    }

    let archives = archive_download_urls(&self.config.api.models_url, alias, &info.commit.commit_id);
    if !archives.zip.is_empty() {
      println!();
      println!("Download: {}", archives.zip);
      println!("          {}", archives.tgz);
    }
    Ok(())
  }

  async fn show_file(&self, alias: &str, commit: &str, path: &str, render: bool) -> Result<()> {
    if is_binary_file(path) {
      return Err(eyre!("{} is a binary file", path));
    }

    let contents = self.workspaces.get_raw_file(alias, commit, path).await?;
    if render && is_markdown_file(path) {
      println!("{}", render_markdown(&contents));
    } else {
      print!("{}", contents);
    }
    Ok(())
  }

  async fn list_exposures(&self, sort: SortOption, refresh: bool) -> Result<()> {
    let exposures = self.exposures.fetch_exposures(refresh).await?;
    println!(
      "{} - {} exposures",
      self.config.display_title(),
      format_number(exposures.len() as i64)
    );
    for exposure in sort_entities(&exposures, sort) {
      println!("{}", exposure_line(&exposure));
    }
    Ok(())
  }

  async fn show_exposure(&self, alias: &str) -> Result<()> {
    let info = self.exposures.get_exposure_info(alias).await?;
    for line in exposure_info_lines(alias, &info) {
      println!("{}", line);
    }

    let combine = combine_archive_url(&self.config.api.models_url, alias);
    if !combine.is_empty() {
      println!();
      println!("COMBINE archive: {}", combine);
    }
    Ok(())
  }

  async fn show_exposure_file(&self, alias: &str, file: &str) -> Result<()> {
    let info = self.exposures.get_exposure_file_info(alias, file).await?;
    let exposure_file = &info.exposure_file;

    println!("{}", exposure_file.workspace_file_path);
    if info.view_keys.is_empty() {
      println!("  no views");
    }
    for view_key in &info.view_keys {
      println!(
        "  {:<24} pmrview view {} {} {}",
        view_key, exposure_file.exposure_id, exposure_file.id, view_key
      );
    }
    Ok(())
  }

  async fn show_view(
    &self,
    exposure_id: i64,
    file_id: i64,
    view_key: &str,
    path: &str,
    raw: bool,
  ) -> Result<()> {
    let content = if raw {
      self
        .exposures
        .get_exposure_raw_content(exposure_id, file_id, view_key, path)
        .await?
    } else {
      let route_path = view_route_path(exposure_id, file_id, view_key);
      self
        .exposures
        .get_exposure_safe_html(exposure_id, file_id, view_key, path, &route_path)
        .await?
    };
    println!("{}", content);
    Ok(())
  }

  async fn search(&self, kind: Option<&str>, term: Option<&str>, refresh: bool) -> Result<()> {
    match (kind, term) {
      (Some(kind), Some(term)) => {
        if !is_valid_term(term) {
          return Err(eyre!("Invalid search term: '{}'", term));
        }
        let result = self.search.search_term(kind, term).await?;
        let pretty = serde_json::to_string_pretty(&result)
          .map_err(|e| eyre!("Failed to format search result: {}", e))?;
        println!("{}", pretty);
      }
      (Some(kind), None) => {
        let categories = self.search.fetch_categories(refresh).await?;
        let category = categories
          .iter()
          .find(|c| c.kind == kind)
          .ok_or_else(|| eyre!("Search kind '{}' is not available", kind))?;
        for line in category_term_lines(category) {
          println!("{}", line);
        }
      }
      _ => {
        let categories = self.search.fetch_categories(refresh).await?;
        for category in &categories {
          println!("{}", category_summary(category));
        }
      }
    }
    Ok(())
  }

  fn notice(&self, dismiss: Option<i64>) -> Result<()> {
    if let Some(days) = dismiss {
      self.notification.dismiss(days)?;
      println!("Notice hidden for {} days", days);
      return Ok(());
    }

    if let Some(text) = &self.config.notice {
      if !self.notification.is_dismissed()? {
        println!("{}", text);
      }
    }
    Ok(())
  }
}

/// Split a shell line on whitespace; double quotes group words and `""` is
/// an empty argument.
fn split_command_line(line: &str) -> Result<Vec<String>> {
  let mut words = Vec::new();
  let mut current = String::new();
  let mut in_word = false;
  let mut quoted = false;

  for c in line.chars() {
    match c {
      '"' => {
        quoted = !quoted;
        in_word = true;
      }
      c if c.is_whitespace() && !quoted => {
        if in_word {
          words.push(std::mem::take(&mut current));
          in_word = false;
        }
      }
      c => {
        current.push(c);
        in_word = true;
      }
    }
  }

  if quoted {
    return Err(eyre!("Unterminated quote"));
  }
  if in_word {
    words.push(current);
  }
  Ok(words)
}

fn description_or_placeholder(description: Option<&str>) -> &str {
  description.filter(|d| !d.is_empty()).unwrap_or(NO_DESCRIPTION)
}

fn workspace_line(workspace: &Workspace) -> String {
  format!(
    "{:<40} {}  {}",
    workspace.alias,
    description_or_placeholder(workspace.entity.description.as_deref()),
    format_date(workspace.entity.created_ts)
  )
}

fn exposure_line(exposure: &Exposure) -> String {
  format!(
    "{:<40} {}  {}",
    exposure.alias,
    description_or_placeholder(exposure.entity.description.as_deref()),
    format_date(exposure.entity.created_ts)
  )
}

fn tree_entry_line(entry: &TreeEntry) -> String {
  if entry.is_tree() {
    format!("  {}/", entry.name)
  } else {
    format!("  {}", entry.name)
  }
}

fn workspace_info_lines(alias: &str, info: &WorkspaceInfo) -> Vec<String> {
  let mut lines = vec![
    format!(
      "{} - {}",
      alias,
      description_or_placeholder(info.workspace.description.as_deref())
    ),
    format!("Commit: {}", info.commit.commit_id),
  ];
  if !info.path.is_empty() {
    lines.push(format!("Path: {}", info.path));
  }

  match &info.target {
    PathTarget::TreeInfo(tree) => {
      let count = format_file_count(tree.filecount as i64);
      if !count.is_empty() {
        lines.push(count);
      }
      lines.extend(tree.entries.iter().map(tree_entry_line));
    }
    PathTarget::FileInfo(file) => {
      lines.push(format!("Size: {} bytes", format_number(file.size as i64)));
      if let Some(mime) = &file.mime_type {
        lines.push(format!("Type: {}", mime));
      }
    }
  }
  lines
}

fn exposure_info_lines(alias: &str, info: &ExposureInfo) -> Vec<String> {
  let mut lines = vec![
    format!(
      "{} - {}",
      alias,
      description_or_placeholder(info.exposure.description.as_deref())
    ),
    format!("Created: {}", format_date(info.exposure.created_ts)),
  ];
  if let Some(workspace) = &info.workspace_alias {
    lines.push(format!(
      "Workspace: {} @ {}",
      workspace, info.exposure.commit_id
    ));
  }
  lines.extend(info.files.iter().map(|(path, exposed)| {
    let marker = if *exposed { "*" } else { " " };
    format!("{} {}", marker, path)
  }));
  lines
}

fn view_route_path(exposure_id: i64, file_id: i64, view_key: &str) -> String {
  format!("/exposure/{}/{}/{}", exposure_id, file_id, view_key)
}

fn category_summary(category: &CategoryData) -> String {
  let label = category_label(&category.kind);
  match (&category.kind_info, &category.error) {
    (_, Some(error)) => format!("{} ({}): {}", label, category.kind, error),
    (Some(info), None) => {
      let terms = info.terms.iter().filter(|t| is_valid_term(t)).count();
      let noun = if terms == 1 { "term" } else { "terms" };
      format!(
        "{} ({}): {} {}",
        label,
        category.kind,
        format_number(terms as i64),
        noun
      )
    }
    (None, None) => format!("{} ({})", label, category.kind),
  }
}

fn category_term_lines(category: &CategoryData) -> Vec<String> {
  let mut lines = vec![category_summary(category)];
  if let Some(info) = &category.kind_info {
    lines.extend(
      info
        .terms
        .iter()
        .filter(|t| is_valid_term(t))
        .map(|t| format!("  {}", t)),
    );
  }
  lines
}
