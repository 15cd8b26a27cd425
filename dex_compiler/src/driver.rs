//! Compilation pipeline: fetch, parse, propagate, flatten.
//!
//! Fetches and per-kind parses run concurrently on blocking tasks; every pass
//! after parsing runs in sequence against one [`CompileContext`].

use std::sync::Arc;

use dex_data::{
    Ability, DexSnapshot, Item, Move, Pokemon, RecordMap, Trainer, TrainerType, Tribe, Type, validate_snapshot,
};
use log::{debug, info, warn};
use tokio::task::{JoinHandle, JoinSet};

use crate::CompileError;
use crate::blocks::{number_by_position, parse_newline_comma, parse_standard};
use crate::config::SourceFiles;
use crate::dispatch::RecordSchema;
use crate::encounters::parse_encounters;
use crate::evolution::{EvolutionForest, build_trees};
use crate::extension::resolve_extensions;
use crate::fetch::Fetch;
use crate::forms::resolve_forms;
use crate::propagate::{build_type_chart, flag_signatures, inherit_along_lines};
use crate::settings::{SettingsKeys, scan_settings};
use crate::version::FormatVersion;

/// Fetched text of every configured source file, grouped by record kind.
#[derive(Debug, Clone, Default)]
pub struct SourceTexts {
    pub settings: String,
    pub types: Vec<String>,
    pub tribes: Vec<String>,
    pub abilities: Vec<String>,
    pub moves: Vec<String>,
    pub items: Vec<String>,
    pub pokemon: Vec<String>,
    pub forms: Vec<String>,
    pub trainer_types: Vec<String>,
    pub trainers: Vec<String>,
    pub encounters: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Types,
    Tribes,
    Abilities,
    Moves,
    Items,
    Pokemon,
    Forms,
    TrainerTypes,
    Trainers,
    Encounters,
}

impl SourceTexts {
    fn group_mut(&mut self, slot: Slot) -> &mut Vec<String> {
        match slot {
            Slot::Types => &mut self.types,
            Slot::Tribes => &mut self.tribes,
            Slot::Abilities => &mut self.abilities,
            Slot::Moves => &mut self.moves,
            Slot::Items => &mut self.items,
            Slot::Pokemon => &mut self.pokemon,
            Slot::Forms => &mut self.forms,
            Slot::TrainerTypes => &mut self.trainer_types,
            Slot::Trainers => &mut self.trainers,
            Slot::Encounters => &mut self.encounters,
        }
    }
}

/// Every path to fetch; `None` marks the settings script.
fn requests(files: &SourceFiles) -> Vec<(Option<Slot>, String)> {
    let groups: [(Slot, &Vec<String>); 10] = [
        (Slot::Types, &files.types),
        (Slot::Tribes, &files.tribes),
        (Slot::Abilities, &files.abilities),
        (Slot::Moves, &files.moves),
        (Slot::Items, &files.items),
        (Slot::Pokemon, &files.pokemon),
        (Slot::Forms, &files.forms),
        (Slot::TrainerTypes, &files.trainer_types),
        (Slot::Trainers, &files.trainers),
        (Slot::Encounters, &files.encounters),
    ];
    let mut out = vec![(None, files.settings.clone())];
    for (slot, paths) in groups {
        out.extend(paths.iter().map(|p| (Some(slot), p.clone())));
    }
    out
}

/// Fetch every configured file concurrently.
///
/// All fetches are awaited; if any of them fails the first failure in
/// request order is returned and nothing is kept.
///
/// # Errors
/// - `Fetch` for the failed file, or `Task` if a worker panicked
pub async fn fetch_sources(fetcher: Arc<dyn Fetch>, files: &SourceFiles) -> Result<SourceTexts, CompileError> {
    let requests = requests(files);
    info!("fetching {} source files", requests.len());

    let mut tasks = JoinSet::new();
    for (order, (slot, path)) in requests.into_iter().enumerate() {
        let fetcher = Arc::clone(&fetcher);
        tasks.spawn_blocking(move || (order, slot, fetcher.fetch(&path)));
    }

    let mut fetched = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        fetched.push(joined?);
    }
    fetched.sort_by_key(|(order, ..)| *order);

    let mut texts = SourceTexts::default();
    for (_, slot, result) in fetched {
        let text = result?;
        match slot {
            Some(slot) => texts.group_mut(slot).push(text),
            None => texts.settings = text,
        }
    }
    Ok(texts)
}

/// Records and derived structures shared by the passes of one run.
#[derive(Debug, Clone)]
pub struct CompileContext {
    pub version: FormatVersion,
    pub snapshot: DexSnapshot,
    /// Form records still keyed `SPECIES,formId`.
    pub raw_forms: RecordMap<Pokemon>,
    pub forest: EvolutionForest,
}

impl CompileContext {
    pub fn new(version: FormatVersion, version_label: &str, dev_build: bool) -> Self {
        Self {
            version,
            snapshot: DexSnapshot {
                version: version_label.to_string(),
                dev_build,
                ..DexSnapshot::default()
            },
            raw_forms: RecordMap::new(),
            forest: EvolutionForest::default(),
        }
    }

    /// Run every pass after parsing, in dependency order.
    ///
    /// # Errors
    /// - the first fatal error of any pass
    pub fn run_passes(&mut self) -> Result<(), CompileError> {
        let snapshot = &mut self.snapshot;
        number_by_position(&self.version, &mut snapshot.types, &mut snapshot.pokemon)?;
        self.forest = build_trees(&mut snapshot.pokemon)?;
        inherit_along_lines(&self.version, &self.forest, &mut snapshot.pokemon);
        flag_signatures(
            &self.forest,
            &snapshot.pokemon,
            &mut snapshot.abilities,
            &mut snapshot.moves,
            &mut snapshot.items,
        );
        snapshot.type_chart = build_type_chart(&snapshot.types)?;
        resolve_extensions(&mut snapshot.trainers)?;
        snapshot.forms = resolve_forms(std::mem::take(&mut self.raw_forms), &snapshot.pokemon)?;
        Ok(())
    }

    /// Replace tree handles with emitted trees and hand out the snapshot.
    pub fn into_snapshot(self) -> DexSnapshot {
        let mut snapshot = self.snapshot;
        for mon in snapshot.pokemon.values_mut() {
            mon.evolution_tree = mon.tree.take().map(|tree| self.forest.flatten(tree));
        }
        snapshot
    }
}

fn parse_kind<R, F>(version: &FormatVersion, texts: Vec<String>, parse: F) -> JoinHandle<Result<RecordMap<R>, CompileError>>
where
    R: Send + 'static,
    F: Fn(&FormatVersion, &str, &mut RecordMap<R>) -> Result<usize, CompileError> + Send + 'static,
{
    let version = version.clone();
    tokio::task::spawn_blocking(move || {
        let mut records = RecordMap::new();
        for text in &texts {
            parse(&version, text, &mut records)?;
        }
        Ok(records)
    })
}

fn standard<R: RecordSchema + Send + 'static>(
    version: &FormatVersion,
    texts: Vec<String>,
) -> JoinHandle<Result<RecordMap<R>, CompileError>> {
    parse_kind(version, texts, parse_standard::<R>)
}

/// Parse every record kind on its own blocking task.
///
/// # Errors
/// - the first parse error in record-kind order
pub async fn parse_sources(
    version: &FormatVersion,
    version_label: &str,
    dev_build: bool,
    texts: SourceTexts,
) -> Result<CompileContext, CompileError> {
    let types = standard::<Type>(version, texts.types);
    let tribes = parse_kind(version, texts.tribes, parse_newline_comma::<Tribe>);
    let abilities = standard::<Ability>(version, texts.abilities);
    let moves = standard::<Move>(version, texts.moves);
    let items = standard::<Item>(version, texts.items);
    let pokemon = standard::<Pokemon>(version, texts.pokemon);
    let forms = standard::<Pokemon>(version, texts.forms);
    let trainer_types = standard::<TrainerType>(version, texts.trainer_types);
    let trainers = standard::<Trainer>(version, texts.trainers);
    let encounters = parse_kind(version, texts.encounters, |_, text, into| parse_encounters(text, into));

    let (types, tribes, abilities, moves, items, pokemon, forms, trainer_types, trainers, encounters) = tokio::try_join!(
        types,
        tribes,
        abilities,
        moves,
        items,
        pokemon,
        forms,
        trainer_types,
        trainers,
        encounters
    )?;

    let mut context = CompileContext::new(version.clone(), version_label, dev_build);
    context.raw_forms = forms?;
    let snapshot = &mut context.snapshot;
    snapshot.types = types?;
    snapshot.tribes = tribes?;
    snapshot.abilities = abilities?;
    snapshot.moves = moves?;
    snapshot.items = items?;
    snapshot.pokemon = pokemon?;
    snapshot.trainer_types = trainer_types?;
    snapshot.trainers = trainers?;
    snapshot.encounters = encounters?;
    info!(
        "parsed {} types, {} moves, {} species, {} forms, {} trainers",
        snapshot.types.len(),
        snapshot.moves.len(),
        snapshot.pokemon.len(),
        context.raw_forms.len(),
        snapshot.trainers.len()
    );
    Ok(context)
}

/// Compile already-fetched source text into a snapshot.
///
/// Validation findings are logged and do not fail the run.
///
/// # Errors
/// - `Settings` when the version cannot be determined
/// - any fatal parse or pass error
pub async fn compile_texts(texts: SourceTexts, keys: &SettingsKeys) -> Result<DexSnapshot, CompileError> {
    let settings = scan_settings(&texts.settings, keys)?;
    let version: FormatVersion = settings.version.parse()?;
    info!(
        "compiling data version {version}{}",
        if settings.dev_mode { " (development build)" } else { "" }
    );

    let mut context = parse_sources(&version, &settings.version, settings.dev_mode, texts).await?;
    context.run_passes()?;
    let snapshot = context.into_snapshot();

    let findings = validate_snapshot(&snapshot);
    for finding in &findings {
        warn!("{finding}");
    }
    debug!("validation finished with {} findings", findings.len());
    Ok(snapshot)
}

/// Fetch every configured file and compile it.
///
/// # Errors
/// - any fetch, parse or pass error; nothing is produced on failure
pub async fn compile(
    fetcher: Arc<dyn Fetch>,
    files: &SourceFiles,
    keys: &SettingsKeys,
) -> Result<DexSnapshot, CompileError> {
    let texts = fetch_sources(fetcher, files).await?;
    compile_texts(texts, keys).await
}
