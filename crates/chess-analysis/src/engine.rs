//! UCI engine oracle.
//!
//! Talks to an external engine such as Stockfish over its stdin/stdout. A
//! dedicated reader thread forwards engine output line by line so every read
//! can be bounded by a deadline.

use crate::oracle::{EngineOptions, Limit, Oracle, OracleError, PrincipalLine};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use uci::{EngineMessage, GoOptions, GuiCommand};

/// Maximum number of lines to read before giving up on a handshake response.
pub const MAX_UCI_LINES: usize = 1000;

/// Time allowed for `uciok` and `readyok`.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Extra time allowed on top of a movetime limit before a query times out.
const DEFAULT_GRACE: Duration = Duration::from_secs(2);

/// Deadline for depth-limited queries.
const DEFAULT_DEPTH_TIMEOUT: Duration = Duration::from_secs(120);

/// Time allowed for `bestmove` after sending `stop`.
const STOP_DRAIN: Duration = Duration::from_secs(1);

/// Oracle backed by a UCI engine.
pub struct UciOracle {
    writer: Box<dyn Write + Send>,
    lines: Receiver<String>,
    child: Option<Child>,
    name: String,
    multipv: usize,
    grace: Duration,
    depth_timeout: Duration,
    /// Set once a search could not be stopped; its output may still arrive.
    stuck: bool,
}

impl UciOracle {
    /// Spawns the engine at `path` and performs the UCI handshake.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::EngineUnavailable`] if the executable is
    /// missing, cannot be started, or does not complete the handshake.
    pub fn spawn(path: &Path) -> Result<Self, OracleError> {
        if !path.exists() {
            return Err(OracleError::EngineUnavailable(format!(
                "engine not found at {}",
                path.display()
            )));
        }

        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                OracleError::EngineUnavailable(format!("failed to start {}: {}", path.display(), e))
            })?;

        let unavailable = || OracleError::EngineUnavailable("engine pipes unavailable".to_string());
        let stdin = child.stdin.take().ok_or_else(unavailable)?;
        let stdout = child.stdout.take().ok_or_else(unavailable)?;

        tracing::info!("Starting engine {}", path.display());
        Self::connect(BufReader::new(stdout), stdin, Some(child))
    }

    /// Connects to an engine over an arbitrary transport and performs the
    /// UCI handshake.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::EngineUnavailable`] if the handshake fails.
    pub fn with_transport<R, W>(reader: R, writer: W) -> Result<Self, OracleError>
    where
        R: BufRead + Send + 'static,
        W: Write + Send + 'static,
    {
        Self::connect(reader, writer, None)
    }

    fn connect<R, W>(reader: R, writer: W, child: Option<Child>) -> Result<Self, OracleError>
    where
        R: BufRead + Send + 'static,
        W: Write + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("uci-reader".to_string())
            .spawn(move || {
                for line in reader.lines() {
                    let Ok(line) = line else { break };
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            })?;

        let mut oracle = Self {
            writer: Box::new(writer),
            lines: rx,
            child,
            name: String::new(),
            multipv: 1,
            grace: DEFAULT_GRACE,
            depth_timeout: DEFAULT_DEPTH_TIMEOUT,
            stuck: false,
        };
        oracle.handshake()?;
        Ok(oracle)
    }

    /// Sets the extra time allowed beyond a movetime limit.
    #[must_use]
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Sets the deadline for depth-limited queries.
    #[must_use]
    pub fn with_depth_timeout(mut self, timeout: Duration) -> Self {
        self.depth_timeout = timeout;
        self
    }

    /// Returns the engine's name as reported via UCI protocol.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn handshake(&mut self) -> Result<(), OracleError> {
        self.send(&GuiCommand::Uci)
            .map_err(|e| OracleError::EngineUnavailable(e.to_string()))?;

        let deadline = Instant::now() + HANDSHAKE_TIMEOUT;
        let mut name = String::new();
        let mut lines_read = 0;
        loop {
            if lines_read > MAX_UCI_LINES {
                return Err(OracleError::EngineUnavailable(
                    "too many lines before uciok".to_string(),
                ));
            }
            lines_read += 1;
            match self.recv(deadline)? {
                Some(EngineMessage::Id { name: Some(n), .. }) => name = n,
                Some(EngineMessage::UciOk) => break,
                Some(_) => {}
                None => {
                    return Err(OracleError::EngineUnavailable(
                        "engine did not answer uci".to_string(),
                    ))
                }
            }
        }

        self.name = if name.is_empty() {
            "Unknown Engine".to_string()
        } else {
            name
        };
        tracing::info!("Engine ready: {}", self.name);
        self.sync()
    }

    /// Sends `isready` and waits for `readyok`.
    fn sync(&mut self) -> Result<(), OracleError> {
        self.send(&GuiCommand::IsReady)?;
        let deadline = Instant::now() + HANDSHAKE_TIMEOUT;
        loop {
            match self.recv(deadline)? {
                Some(EngineMessage::ReadyOk) => return Ok(()),
                Some(_) => {}
                None => {
                    return Err(OracleError::EngineUnavailable(
                        "engine did not answer isready".to_string(),
                    ))
                }
            }
        }
    }

    fn ensure_usable(&self) -> Result<(), OracleError> {
        if self.stuck {
            return Err(OracleError::EngineUnavailable(
                "engine is still busy with an earlier search".to_string(),
            ));
        }
        Ok(())
    }

    fn send(&mut self, command: &GuiCommand) -> Result<(), OracleError> {
        let line = command.to_uci();
        tracing::debug!(">> {}", line);
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Next engine message, or `None` once `deadline` has passed.
    fn recv(&mut self, deadline: Instant) -> Result<Option<EngineMessage>, OracleError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match self.lines.recv_timeout(remaining) {
            Ok(line) => {
                tracing::debug!("<< {}", line);
                Ok(Some(EngineMessage::parse(&line)))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(OracleError::EngineUnavailable(
                "engine closed its output".to_string(),
            )),
        }
    }

    /// Runs one search and returns the final principal lines plus the best move.
    fn search(
        &mut self,
        history: &[String],
        limit: Limit,
        lines: usize,
    ) -> Result<(Vec<PrincipalLine>, Option<String>), OracleError> {
        self.ensure_usable()?;
        let lines = lines.max(1);
        if lines != self.multipv {
            self.send(&GuiCommand::set_option("MultiPV", lines))?;
            self.multipv = lines;
        }

        self.send(&GuiCommand::Position {
            fen: None,
            moves: history.to_vec(),
        })?;
        let (go, budget) = match limit {
            Limit::Time(t) => (
                GoOptions::movetime(t.as_millis() as u64),
                t + self.grace,
            ),
            Limit::Depth(d) => (GoOptions::depth(d), self.depth_timeout),
        };
        self.send(&GuiCommand::Go(go))?;

        let deadline = Instant::now() + budget;
        let mut best: Vec<Option<PrincipalLine>> = vec![None; lines];
        loop {
            match self.recv(deadline)? {
                Some(EngineMessage::Info(info)) => {
                    // Bound scores come from aspiration re-searches.
                    if info.bound.is_some() || info.pv.is_empty() {
                        continue;
                    }
                    let Some(score) = info.score else { continue };
                    let k = info.multipv.unwrap_or(1) as usize;
                    if (1..=lines).contains(&k) {
                        best[k - 1] = Some(PrincipalLine {
                            moves: info.pv,
                            score: score.into(),
                        });
                    }
                }
                Some(EngineMessage::BestMove { mv, .. }) => {
                    return Ok((best.into_iter().flatten().collect(), mv));
                }
                Some(_) => {}
                None => {
                    tracing::warn!("Engine query exceeded {:?}, stopping search", budget);
                    self.abort()?;
                    return Err(OracleError::QueryTimedOut(budget));
                }
            }
        }
    }

    /// Stops a running search and drains its `bestmove`.
    ///
    /// If the engine does not answer, the oracle refuses all later requests.
    fn abort(&mut self) -> Result<(), OracleError> {
        self.stuck = true;
        self.send(&GuiCommand::Stop)?;
        let deadline = Instant::now() + STOP_DRAIN;
        loop {
            match self.recv(deadline)? {
                Some(EngineMessage::BestMove { .. }) => {
                    self.stuck = false;
                    return Ok(());
                }
                Some(_) => {}
                None => {
                    tracing::error!("Engine ignored stop; refusing further queries");
                    return Err(OracleError::EngineUnavailable(
                        "engine ignored stop".to_string(),
                    ));
                }
            }
        }
    }
}

impl Oracle for UciOracle {
    fn evaluate(
        &mut self,
        history: &[String],
        limit: Limit,
        lines: usize,
    ) -> Result<Vec<PrincipalLine>, OracleError> {
        let (found, best_move) = self.search(history, limit, lines)?;
        if found.is_empty() && best_move.is_some() {
            return Err(OracleError::QueryFailed(
                "engine reported a move but no score".to_string(),
            ));
        }
        Ok(found)
    }

    fn best_move(
        &mut self,
        history: &[String],
        limit: Limit,
    ) -> Result<Option<String>, OracleError> {
        let lines = self.multipv;
        self.search(history, limit, lines).map(|(_, mv)| mv)
    }

    fn configure(&mut self, options: &EngineOptions) -> Result<(), OracleError> {
        self.ensure_usable()?;
        self.send(&GuiCommand::set_option("Threads", options.threads))?;
        self.send(&GuiCommand::set_option("Hash", options.hash_mb))?;
        match options.elo_limit {
            Some(elo) => {
                self.send(&GuiCommand::set_option("UCI_LimitStrength", true))?;
                self.send(&GuiCommand::set_option("UCI_Elo", elo))?;
            }
            None => self.send(&GuiCommand::set_option("UCI_LimitStrength", false))?,
        }
        if let Some(level) = options.skill_level {
            self.send(&GuiCommand::set_option("Skill Level", level))?;
        }
        self.sync()
    }

    /// Clear the engine's hash tables and prepare for a new game.
    fn new_game(&mut self) -> Result<(), OracleError> {
        self.ensure_usable()?;
        self.send(&GuiCommand::UciNewGame)?;
        self.sync()
    }
}

impl Drop for UciOracle {
    fn drop(&mut self) {
        // Try to send quit command to gracefully terminate the engine
        let _ = self.send(&GuiCommand::Quit);
        if let Some(child) = self.child.as_mut() {
            for _ in 0..50 {
                if let Ok(Some(_)) = child.try_wait() {
                    return;
                }
                thread::sleep(Duration::from_millis(10));
            }
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
