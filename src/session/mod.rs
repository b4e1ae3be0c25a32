use anyhow::{anyhow, bail, Result};
use std::{
    io::{BufRead, Write},
    str::FromStr,
    sync::Arc,
};
use tracing::{info, warn};

use crate::cache::TableCache;
use crate::config::Config;
use crate::dashboard::{render_table, write, Dashboard};
use crate::filter::{filter_table, FilterParams, PriceRange};
use crate::schema::CleanTable;

const HELP: &str = "\
commands:
  locations all | none | NAME, NAME, ...   select locations
  types all | none | TYPE, TYPE, ...       select service types
  price MIN MAX                            select price range (inclusive)
  reset                                    back to the initial selection
  show                                     KPIs and charts
  table [N]                                first N rows of the data table
  options                                  list selectable values
  reload                                   reload the source file
  help | quit";

/// A selection for a multi-valued filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    All,
    None,
    Only(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Locations(Selection),
    Types(Selection),
    Price(PriceRange),
    Reset,
    Show,
    Table(Option<usize>),
    Options,
    Reload,
    Help,
    Quit,
}

fn parse_selection(args: &str) -> Selection {
    match args.trim() {
        "all" | "*" => Selection::All,
        "" | "none" => Selection::None,
        list => Selection::Only(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
    }
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let cmd = match verb.to_ascii_lowercase().as_str() {
            "locations" | "loc" => Command::Locations(parse_selection(args)),
            "types" | "type" => Command::Types(parse_selection(args)),
            "price" => {
                let nums: Vec<f64> = args
                    .split_whitespace()
                    .map(|n| n.replace(',', "").parse::<f64>())
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| anyhow!("price bounds must be numbers: {e}"))?;
                match nums.as_slice() {
                    [min, max] => Command::Price(PriceRange::new(*min, *max)),
                    _ => bail!("usage: price MIN MAX"),
                }
            }
            "reset" => Command::Reset,
            "show" => Command::Show,
            "table" => match args.trim() {
                "" => Command::Table(None),
                n => Command::Table(Some(
                    n.parse().map_err(|_| anyhow!("usage: table [N]"))?,
                )),
            },
            "options" => Command::Options,
            "reload" => Command::Reload,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => bail!("unknown command `{other}` (try `help`)"),
        };
        Ok(cmd)
    }
}

/// One user's view onto the shared table: the cache plus the current
/// selection. Every interaction re-checks the cache and recomputes.
pub struct Session {
    config: Config,
    cache: TableCache,
    params: Option<FilterParams>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cache: TableCache::new(),
            params: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn params(&self) -> Option<&FilterParams> {
        self.params.as_ref()
    }

    /// Current table (reloaded if the source changed) and selection.
    pub fn snapshot(&mut self) -> Result<(Arc<CleanTable>, FilterParams)> {
        let table = self.cache.get(&self.config.data_path)?;
        let params = self
            .params
            .get_or_insert_with(|| self.config.initial_params(&table))
            .clone();
        Ok((table, params))
    }

    /// Build the dashboard for the current selection.
    pub fn dashboard(&mut self) -> Result<Dashboard> {
        let (table, params) = self.snapshot()?;
        let view = filter_table(&table, &params);
        Ok(Dashboard::build(&view, &params, self.config.top_cuisines))
    }

    pub fn render<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let dashboard = self.dashboard()?;
        write!(out, "{}", dashboard.render_text())?;
        Ok(())
    }

    pub fn render_table<W: Write>(&mut self, out: &mut W, limit: usize) -> Result<()> {
        let (table, params) = self.snapshot()?;
        let view = filter_table(&table, &params);
        writeln!(out, "{}", render_table(&view, limit)?)?;
        Ok(())
    }

    /// Write the configured JSON / Parquet outputs for the current selection.
    pub fn export(&mut self) -> Result<()> {
        let (table, params) = self.snapshot()?;
        let view = filter_table(&table, &params);
        if let Some(path) = &self.config.output.json {
            let dashboard = Dashboard::build(&view, &params, self.config.top_cuisines);
            write::write_json(path, &dashboard)?;
        }
        if let Some(path) = &self.config.output.parquet {
            write::write_parquet(path, &view)?;
        }
        Ok(())
    }

    /// Apply one command. Returns `false` when the session should end.
    pub fn handle<W: Write>(&mut self, cmd: Command, out: &mut W) -> Result<bool> {
        match cmd {
            Command::Locations(sel) => {
                let (table, mut params) = self.snapshot()?;
                params.locations = match sel {
                    Selection::All => table.locations().into_iter().collect(),
                    Selection::None => Default::default(),
                    Selection::Only(names) => names.into_iter().collect(),
                };
                self.params = Some(params);
                self.render(out)?;
            }
            Command::Types(sel) => {
                let (table, mut params) = self.snapshot()?;
                params.service_types = match sel {
                    Selection::All => table.service_types().into_iter().collect(),
                    Selection::None => Default::default(),
                    Selection::Only(names) => names.into_iter().collect(),
                };
                self.params = Some(params);
                self.render(out)?;
            }
            Command::Price(range) => {
                let (_, mut params) = self.snapshot()?;
                params.price_range = range;
                self.params = Some(params);
                self.render(out)?;
            }
            Command::Reset => {
                self.params = None;
                self.render(out)?;
            }
            Command::Show => self.render(out)?,
            Command::Table(n) => {
                let limit = n.unwrap_or(self.config.table_rows);
                self.render_table(out, limit)?;
            }
            Command::Options => {
                let (table, _) = self.snapshot()?;
                writeln!(out, "locations: {}", table.locations().join(", "))?;
                writeln!(out, "types: {}", table.service_types().join(", "))?;
                if let Some(domain) = PriceRange::domain(&table) {
                    writeln!(out, "price: {} .. {}", domain.min, domain.max)?;
                }
            }
            Command::Reload => {
                self.cache.invalidate();
                let (table, _) = self.snapshot()?;
                info!(rows = table.len(), "reloaded source");
                writeln!(out, "reloaded {} rows", table.len())?;
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Read commands line by line until EOF or `quit`. Bad commands are
    /// reported and the loop continues.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        writeln!(out, "type `help` for commands")?;
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let cmd = match line.parse::<Command>() {
                Ok(cmd) => cmd,
                Err(e) => {
                    writeln!(out, "{e}")?;
                    continue;
                }
            };
            match self.handle(cmd, out) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    warn!(error = ?e, "command failed");
                    writeln!(out, "error: {e:#}")?;
                }
            }
            out.flush()?;
        }
        Ok(())
    }
}
