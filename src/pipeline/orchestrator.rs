//! Pipeline orchestrator - composes navigation, mirror selection and resolution
//!
//! Everything here runs strictly in sequence: one page, one mirror, one
//! resolution at a time, in listing order.

use crate::catalog::{
    classify, episode_number, CatalogEntry, DownloadLink, HierarchyNode, LinkExtractor,
    Navigator, NodeKind,
};
use crate::config::Config;
use crate::http::{build_download_client, Fetcher};
use crate::pipeline::persist::{download_file, folder_for_query, safe_file_name};
use crate::pipeline::selection::EpisodeSelection;
use crate::pipeline::{Action, ItemOutcome, Mode};
use crate::prompt::{prompt_in_range, prompt_index, prompt_index_or_skip, Prompter};
use crate::resolver::host::{is_loose_aggregator, is_strict_aggregator};
use crate::resolver::{
    classify_host, AggregatorResolver, BrowserLauncher, DoodResolver, HostKind, ResolvedMedia,
};
use crate::{DlError, PromptError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One mirror of a content page, with its direct link if it was resolvable inline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorReport {
    pub link: DownloadLink,
    pub direct: Option<ResolvedMedia>,
}

/// What `lookup` found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The search returned nothing
    NoResults,
    /// The chosen index was outside the result list
    InvalidSelection,
    /// Seasons of a series page
    Seasons(Vec<HierarchyNode>),
    /// Episodes of a season page (listing only)
    Episodes(Vec<HierarchyNode>),
    /// Every episode of a season, each with its mirrors
    AllEpisodes(Vec<(HierarchyNode, Vec<MirrorReport>)>),
    /// Mirrors of a movie or episode page
    Mirrors(Vec<MirrorReport>),
}

/// Inputs of the `fetch` flow; anything left `None` is prompted for
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub query: Option<String>,
    pub mode: Option<Mode>,
    pub action: Option<Action>,
    /// 1-based index into the search results
    pub index: Option<usize>,
    /// Case-insensitive substring of the preferred quality name
    pub quality: Option<String>,
}

/// Per-item settings shared by every item of one `fetch` run
struct ItemContext {
    action: Action,
    quality: Option<String>,
    folder: PathBuf,
}

/// The link resolution pipeline
pub struct Pipeline {
    config: Config,
    downloader: reqwest::Client,
    navigator: Navigator,
    links: LinkExtractor,
    dood: DoodResolver,
    aggregator: AggregatorResolver,
    prompter: Box<dyn Prompter>,
}

impl Pipeline {
    /// Creates a pipeline
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `launcher` - Starts the browser used for aggregator mirrors
    /// * `prompter` - Source of interactive answers
    pub fn new(
        config: Config,
        launcher: Arc<dyn BrowserLauncher>,
        prompter: Box<dyn Prompter>,
    ) -> Result<Self, DlError> {
        let fetcher = Fetcher::from_config(&config, false)?;

        Ok(Self {
            navigator: Navigator::new(&config, fetcher.clone())?,
            links: LinkExtractor::new(fetcher)?,
            dood: DoodResolver::new(&config)?,
            aggregator: AggregatorResolver::new(&config, launcher)?,
            downloader: build_download_client(&config)?,
            config,
            prompter,
        })
    }

    // ===== lookup =====

    /// Searches for `input` (or opens it, if it is a URL) and reports what is there
    ///
    /// `index` is the 1-based search result to open; without it the user is asked.
    pub async fn lookup(
        &mut self,
        input: &str,
        index: Option<usize>,
        fetch_all: bool,
    ) -> Result<LookupOutcome, DlError> {
        if input.starts_with("http") {
            return Ok(self.process_url(input, fetch_all).await);
        }

        let results = self.navigator.search(input).await;
        if results.is_empty() {
            println!("No results found.");
            return Ok(LookupOutcome::NoResults);
        }

        print_results(&results);

        let choice = match index {
            Some(n) => n.checked_sub(1),
            None => Some(prompt_index(
                self.prompter.as_mut(),
                "\nEnter the number of the movie to download: ",
                results.len(),
            )?),
        };

        let selected = match choice.and_then(|i| results.get(i)) {
            Some(selected) => selected,
            None => {
                println!("Invalid selection.");
                return Ok(LookupOutcome::InvalidSelection);
            }
        };

        println!("\nSelected: {}", selected.title);
        Ok(self.process_url(&selected.url, fetch_all).await)
    }

    /// Dispatches a catalog URL by kind
    pub async fn process_url(&mut self, url: &str, fetch_all: bool) -> LookupOutcome {
        tracing::info!("Processing URL: {}", url);

        match classify(url) {
            NodeKind::Series => {
                tracing::info!("Detected Series. Fetching Seasons...");
                let seasons = self.navigator.list_seasons(url).await;
                print_nodes("Seasons", &seasons);
                LookupOutcome::Seasons(seasons)
            }
            NodeKind::Season => {
                tracing::info!("Detected Season. Fetching Episodes...");
                let episodes = self.navigator.list_episodes(url).await;

                if !fetch_all {
                    print_nodes("Episodes", &episodes);
                    return LookupOutcome::Episodes(episodes);
                }
                if episodes.is_empty() {
                    print_nodes("Episodes", &episodes);
                    return LookupOutcome::AllEpisodes(Vec::new());
                }

                println!("Found {} Episodes:", episodes.len());
                let total = episodes.len();
                let mut processed = Vec::with_capacity(total);
                for (i, episode) in episodes.into_iter().enumerate() {
                    println!(
                        "\n[{}/{}] Processing {} : {}",
                        i + 1,
                        total,
                        episode.display_name,
                        episode.url
                    );
                    let mirrors = self.report_mirrors(&episode.url).await;
                    processed.push((episode, mirrors));
                }
                LookupOutcome::AllEpisodes(processed)
            }
            NodeKind::Downloadable => LookupOutcome::Mirrors(self.report_mirrors(url).await),
        }
    }

    /// Lists a page's mirrors, resolving lightweight ones on the spot
    pub async fn report_mirrors(&mut self, url: &str) -> Vec<MirrorReport> {
        let links = self.links.get_download_links(url).await;
        if links.is_empty() {
            println!("No download links found.");
            return Vec::new();
        }

        println!("Found {} download links:", links.len());
        let mut reports = Vec::with_capacity(links.len());
        for (i, link) in links.into_iter().enumerate() {
            let direct = match classify_host(&link, &self.config.hosts) {
                HostKind::Lightweight => self.dood.resolve(&link).await,
                _ => None,
            };

            println!(
                "{}. Server: {} | Quality: {} | URL: {}",
                i + 1,
                link.server_name,
                link.quality_label,
                link.redirect_url
            );
            if let Some(media) = &direct {
                println!("    -> DIRECT DOWNLOAD: {}", media.final_url());
            }

            reports.push(MirrorReport { link, direct });
        }
        reports
    }

    // ===== fetch =====

    /// Interactive search → select → resolve → report/download flow
    pub async fn fetch(&mut self, options: FetchOptions) -> Result<Vec<ItemOutcome>, DlError> {
        let mode = match options.mode {
            Some(mode) => mode,
            None => self.ask_mode()?,
        };
        let action = match options.action {
            Some(action) => action,
            None => self.ask_action()?,
        };
        let query = match options.query {
            Some(query) => query,
            None => self.prompter.read_line("Enter search query: ")?.trim().to_string(),
        };
        if query.is_empty() {
            println!("Query cannot be empty.");
            return Ok(Vec::new());
        }

        println!("\nSearching for '{}'...", query);
        let results = self.navigator.search(&query).await;
        if results.is_empty() {
            println!("No results found.");
            return Ok(Vec::new());
        }

        let selected = self.choose_result(&results, options.index)?;
        println!("Selected: {}", selected.title);

        let folder = folder_for_query(&self.config.output.download_dir, &query);
        if action == Action::Download {
            tokio::fs::create_dir_all(&folder).await?;
        }

        let context = ItemContext {
            action,
            quality: options.quality,
            folder,
        };

        match mode {
            Mode::Movie => self.fetch_movie(&selected, &context).await,
            Mode::Series => self.fetch_series(&selected, &context).await,
        }
    }

    async fn fetch_movie(
        &mut self,
        selected: &CatalogEntry,
        context: &ItemContext,
    ) -> Result<Vec<ItemOutcome>, DlError> {
        tracing::info!("Fetching content details...");
        let items = self.navigator.list_collection(&selected.url).await;

        if items.is_empty() {
            let outcome = self
                .process_item(&selected.url, &selected.title, context)
                .await?;
            return Ok(vec![outcome]);
        }

        println!("\nFound {} items in this collection:", items.len());
        print_results(&items);
        println!("Select item to download (or 0 for all):");
        let choice = prompt_in_range(self.prompter.as_mut(), "Selection: ", 0, items.len())?;

        let chosen: Vec<&CatalogEntry> = if choice == 0 {
            items.iter().collect()
        } else {
            vec![&items[choice - 1]]
        };

        let mut outcomes = Vec::with_capacity(chosen.len());
        for item in chosen {
            outcomes.push(self.process_item(&item.url, &item.title, context).await?);
        }
        Ok(outcomes)
    }

    async fn fetch_series(
        &mut self,
        selected: &CatalogEntry,
        context: &ItemContext,
    ) -> Result<Vec<ItemOutcome>, DlError> {
        tracing::info!("Fetching episodes...");
        let episodes = self.navigator.list_series_episodes(&selected.url).await;
        if episodes.is_empty() {
            println!("No episodes found. It might be a movie or the structure is different.");
            return Ok(Vec::new());
        }

        println!("Found {} episodes.", episodes.len());
        println!("Enter episode number(s) (e.g. '1', '1-5', 'all'):");
        let selection = self.ask_episode_selection()?;

        let mut outcomes = Vec::new();
        for index in selection.indices(episodes.len()) {
            let episode = &episodes[index];
            let number = episode_number(&episode.url).unwrap_or(index as u32 + 1);
            let item_name = format!("{}_Ep{}", selected.title, number);
            outcomes.push(self.process_item(&episode.url, &item_name, context).await?);
        }
        Ok(outcomes)
    }

    /// Resolves one movie or episode and reports or downloads it
    async fn process_item(
        &mut self,
        url: &str,
        item_name: &str,
        context: &ItemContext,
    ) -> Result<ItemOutcome, DlError> {
        println!("\nProcessing: {}...", item_name);

        let links = self.links.get_download_links(url).await;
        if links.is_empty() {
            println!("No links found at all.");
            return Ok(ItemOutcome::NoLinks);
        }

        let (link, kind) = match self.select_mirror(&links)? {
            Some(choice) => choice,
            None => {
                println!("Skipping as no suitable server found.");
                return Ok(ItemOutcome::Skipped);
            }
        };
        println!("Found Download link: {}", link.redirect_url);

        let media = match self
            .resolve_link(&link, kind, context.quality.as_deref())
            .await
        {
            Some(media) => media,
            None => {
                println!("Failed to resolve final download link.");
                return Ok(ItemOutcome::Unresolved);
            }
        };
        println!("Resolved Final URL: {}", media.final_url());

        match context.action {
            Action::Link => {
                println!(
                    "\n[DIRECT LINK] {} ({}):\n{}\n",
                    item_name,
                    media.quality_name(),
                    media.final_url()
                );
                Ok(ItemOutcome::Linked(media))
            }
            Action::Download => Ok(self.persist(media, item_name, &context.folder).await),
        }
    }

    /// Picks the mirror to resolve and the strategy to resolve it with
    ///
    /// The exact aggregator marker wins, then a loose "multi" hint; otherwise
    /// the user chooses from the full list (`0` skips). A hand-picked mirror
    /// goes to the browser walk unless it is a known lightweight host.
    pub fn select_mirror(
        &mut self,
        links: &[DownloadLink],
    ) -> Result<Option<(DownloadLink, HostKind)>, PromptError> {
        let hosts = &self.config.hosts;

        if let Some(link) = links.iter().find(|l| is_strict_aggregator(l, hosts)) {
            return Ok(Some((link.clone(), classify_host(link, hosts))));
        }

        println!("No 'Multi Download' server found. Checking alternatives...");
        if let Some(link) = links.iter().find(|l| is_loose_aggregator(l, hosts)) {
            println!("Found alternative: {}", link.server_name);
            return Ok(Some((link.clone(), classify_host(link, hosts))));
        }

        if links.is_empty() {
            return Ok(None);
        }

        let prompter = self.prompter.as_mut();
        prompter.show("Available servers:");
        for (i, link) in links.iter().enumerate() {
            prompter.show(&format!("{}. {}", i + 1, link.server_name));
        }
        let choice = prompt_index_or_skip(
            prompter,
            "Select server (number) or 0 to skip: ",
            links.len(),
        )?;
        Ok(choice.map(|i| {
            let link = links[i].clone();
            let kind = match classify_host(&link, hosts) {
                HostKind::Lightweight => HostKind::Lightweight,
                _ => HostKind::Aggregator,
            };
            (link, kind)
        }))
    }

    /// Sends a mirror to the strategy for `kind`
    pub async fn resolve_link(
        &mut self,
        link: &DownloadLink,
        kind: HostKind,
        quality: Option<&str>,
    ) -> Option<ResolvedMedia> {
        match kind {
            HostKind::Lightweight => self.dood.resolve(link).await,
            HostKind::Aggregator => {
                self.aggregator
                    .resolve(&link.redirect_url, quality, self.prompter.as_mut())
                    .await
            }
            HostKind::Unsupported => {
                tracing::warn!("No strategy for server '{}'", link.server_name);
                None
            }
        }
    }

    async fn persist(&self, media: ResolvedMedia, item_name: &str, folder: &Path) -> ItemOutcome {
        let path = folder.join(safe_file_name(item_name, media.quality_name()));
        let referer = self.config.site.download_referer.as_deref();

        let read_timeout = self.config.timing.request_timeout();

        match download_file(&self.downloader, media.final_url(), referer, &path, read_timeout).await
        {
            Ok(_) => {
                println!("Download complete: {}", path.display());
                ItemOutcome::Downloaded { media, path }
            }
            Err(e) => {
                println!("Download failed: {}", e);
                ItemOutcome::DownloadFailed(media)
            }
        }
    }

    // ===== prompts =====

    fn choose_result(
        &mut self,
        results: &[CatalogEntry],
        index: Option<usize>,
    ) -> Result<CatalogEntry, PromptError> {
        println!("\nSelect Content:");
        print_results(results);

        if let Some(i) = index.and_then(|n| n.checked_sub(1)) {
            if let Some(entry) = results.get(i) {
                return Ok(entry.clone());
            }
            println!("Invalid selection.");
        }

        let i = prompt_index(self.prompter.as_mut(), "Selection: ", results.len())?;
        Ok(results[i].clone())
    }

    fn ask_mode(&mut self) -> Result<Mode, PromptError> {
        let prompter = self.prompter.as_mut();
        prompter.show("\nSelect Mode:\n1. Movie\n2. Series");
        let choice = prompt_index(prompter, "Selection: ", 2)?;
        Ok(if choice == 0 { Mode::Movie } else { Mode::Series })
    }

    fn ask_action(&mut self) -> Result<Action, PromptError> {
        let prompter = self.prompter.as_mut();
        prompter.show("\nSelect Action:\n1. Download File\n2. Get Direct Link Only");
        let choice = prompt_index(prompter, "Selection: ", 2)?;
        Ok(if choice == 0 {
            Action::Download
        } else {
            Action::Link
        })
    }

    fn ask_episode_selection(&mut self) -> Result<EpisodeSelection, PromptError> {
        loop {
            let answer = self.prompter.read_line("> ")?;
            match answer.parse::<EpisodeSelection>() {
                Ok(selection) => return Ok(selection),
                Err(e) => self.prompter.show(&format!("Invalid input. {}", e)),
            }
        }
    }
}

fn print_results(results: &[CatalogEntry]) {
    println!("\nFound {} results:", results.len());
    for (i, entry) in results.iter().enumerate() {
        println!("{}. {}", i + 1, entry.title);
    }
}

fn print_nodes(kind: &str, nodes: &[HierarchyNode]) {
    if nodes.is_empty() {
        println!("No {} found.", kind.to_lowercase());
        return;
    }

    println!("Found {} {}:", nodes.len(), kind);
    for (i, node) in nodes.iter().enumerate() {
        println!("{}. {} : {}", i + 1, node.display_name, node.url);
    }
}
