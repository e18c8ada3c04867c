//! Conflict resolution strategies.
//!
//! When the solver finds the current facts unsatisfiable with the rules, it
//! hands a minimal conflict core to a [`ConflictResolver`], which decides
//! which of the conflicting facts survive.

use std::collections::VecDeque;
use std::fmt;
use std::io::{BufRead, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::fact::Fact;

/// Facts that cannot all hold together under the current rules.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ConflictCore {
    facts: Vec<Fact>,
}

impl ConflictCore {
    pub fn new(facts: Vec<Fact>) -> Self {
        Self { facts }
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Position of the fact stating the given proposition, e.g. `"Cause(A, B)"`.
    pub fn position(&self, proposition: &str) -> Option<usize> {
        self.facts.iter().position(|f| f.proposition() == proposition)
    }
}

impl fmt::Display for ConflictCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, fact) in self.facts.iter().enumerate() {
            writeln!(f, "  [{}] {}", i, fact)?;
        }
        Ok(())
    }
}

/// Decision on a conflict core.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Resolution {
    /// Keep the facts at these positions, drop the rest.
    Retain(Vec<usize>),
    /// Drop every fact in the core.
    DiscardAll,
}

impl Resolution {
    /// Positions of the facts to drop.
    ///
    /// Fails unless the decision drops at least one fact and names only
    /// positions inside the core.
    pub fn discarded(&self, core: &ConflictCore) -> Result<Vec<usize>> {
        match self {
            Resolution::DiscardAll => Ok((0..core.len()).collect()),
            Resolution::Retain(keep) => {
                if let Some(&bad) = keep.iter().find(|&&i| i >= core.len()) {
                    return Err(Error::InvalidResolution(format!(
                        "index {} is out of range for a core of {} facts",
                        bad,
                        core.len()
                    )));
                }
                let dropped: Vec<usize> = (0..core.len()).filter(|i| !keep.contains(i)).collect();
                if dropped.is_empty() {
                    return Err(Error::InvalidResolution(
                        "the whole core was retained; at least one fact must be dropped".to_string(),
                    ));
                }
                Ok(dropped)
            }
        }
    }
}

pub trait ConflictResolver {
    fn resolve(&mut self, core: &ConflictCore) -> Result<Resolution>;
}

impl<R: ConflictResolver + ?Sized> ConflictResolver for &mut R {
    fn resolve(&mut self, core: &ConflictCore) -> Result<Resolution> {
        (**self).resolve(core)
    }
}

impl<R: ConflictResolver + ?Sized> ConflictResolver for Box<R> {
    fn resolve(&mut self, core: &ConflictCore) -> Result<Resolution> {
        (**self).resolve(core)
    }
}

/// Pre-seeded answers, consumed one per conflict.
#[derive(Debug, Clone, Default)]
pub struct ScriptedResolver {
    answers: VecDeque<Resolution>,
    seen: Vec<ConflictCore>,
}

impl ScriptedResolver {
    pub fn new(answers: impl IntoIterator<Item = Resolution>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            seen: Vec::new(),
        }
    }

    /// Cores presented so far.
    pub fn seen(&self) -> &[ConflictCore] {
        &self.seen
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl ConflictResolver for ScriptedResolver {
    fn resolve(&mut self, core: &ConflictCore) -> Result<Resolution> {
        self.seen.push(core.clone());
        self.answers
            .pop_front()
            .ok_or_else(|| Error::Cancelled(format!("no scripted answer left for conflict:\n{}", core)))
    }
}

/// Resolver backed by a closure.
pub struct FnResolver<F>(pub F);

impl<F> ConflictResolver for FnResolver<F>
where
    F: FnMut(&ConflictCore) -> Result<Resolution>,
{
    fn resolve(&mut self, core: &ConflictCore) -> Result<Resolution> {
        (self.0)(core)
    }
}

/// Interactive resolver: prints the core and reads the index of the single
/// fact to keep, or `none` (also `-1`) to drop them all.
///
/// A core of one fact only accepts `none`.
pub struct PromptResolver<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, core: &ConflictCore) -> std::io::Result<Option<String>> {
        if core.len() == 1 {
            writeln!(self.output, "The following fact cannot hold:")?;
            write!(self.output, "{}", core)?;
            write!(self.output, "It will be dropped. [type 'none' to continue] ")?;
        } else {
            writeln!(self.output, "The following facts conflict:")?;
            write!(self.output, "{}", core)?;
            write!(
                self.output,
                "Which one should be kept? [0-{}, or 'none'] ",
                core.len() - 1
            )?;
        }
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl<R: BufRead, W: Write> ConflictResolver for PromptResolver<R, W> {
    fn resolve(&mut self, core: &ConflictCore) -> Result<Resolution> {
        loop {
            let answer = self
                .ask(core)
                .map_err(|e| Error::Cancelled(format!("prompt failed: {}", e)))?
                .ok_or_else(|| Error::Cancelled("input closed".to_string()))?;

            if answer.eq_ignore_ascii_case("none") || answer == "-1" {
                return Ok(Resolution::DiscardAll);
            }
            match answer.parse::<usize>() {
                // Keeping the only fact of a core would keep the conflict.
                Ok(i) if i < core.len() && core.len() > 1 => return Ok(Resolution::Retain(vec![i])),
                _ => {
                    writeln!(self.output, "Invalid choice '{}'", answer)
                        .map_err(|e| Error::Cancelled(format!("prompt failed: {}", e)))?;
                }
            }
        }
    }
}

/// Forwards cores over a channel and waits for the answer, for callers
/// that resolve conflicts on another thread.
pub struct ChannelResolver {
    requests: Sender<ConflictCore>,
    responses: Receiver<Resolution>,
    timeout: Duration,
}

impl ChannelResolver {
    pub fn new(requests: Sender<ConflictCore>, responses: Receiver<Resolution>, timeout: Duration) -> Self {
        Self {
            requests,
            responses,
            timeout,
        }
    }
}

impl ConflictResolver for ChannelResolver {
    fn resolve(&mut self, core: &ConflictCore) -> Result<Resolution> {
        self.requests
            .send(core.clone())
            .map_err(|_| Error::Cancelled("resolver disconnected".to_string()))?;
        self.responses.recv_timeout(self.timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => Error::Cancelled(format!("no answer within {:?}", self.timeout)),
            RecvTimeoutError::Disconnected => Error::Cancelled("resolver disconnected".to_string()),
        })
    }
}
