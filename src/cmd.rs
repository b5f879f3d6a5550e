//! Command line interface

use std::error::Error;

use bvsimp::error::{EvaluationError, SimulationError};
use bvsimp::sim::{Assignment, Simulator};
use bvsimp::simplify::TermEvaluator;
use bvsimp::term::generators::random;
use bvsimp::term::stats::stats;
use bvsimp::term::Term;
use clap::{Args, Parser, Subcommand};
use itertools::Itertools;
use kdam::{tqdm, BarExt};
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Command line arguments
#[derive(Subcommand)]
pub enum Commands {
    /// Check the simplification engine on random terms
    ///
    /// Each term is simplified, then the original and simplified terms are simulated
    /// on random assignments of their symbols. The command fails on the first term
    /// whose simplified form is not equivalent, and prints the failing assignment.
    #[clap(alias = "fuzz")]
    Check(CheckArgs),

    /// Show a random term before and after simplification
    ///
    /// Will print statistics on the number of nodes and operators of both terms.
    #[clap()]
    Show(ShowArgs),
}

/// Error returned by a command
#[derive(Debug, Error)]
pub enum CommandError {
    /// A term could not be simplified
    #[error("simplification of term {index} failed")]
    Simplification {
        /// Index of the term
        index: usize,
        /// Cause of the failure
        #[source]
        source: EvaluationError,
    },

    /// A term could not be simulated
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    /// A simplified term is not equivalent to the original one
    #[error("term {index} is not equivalent to its simplified form")]
    Mismatch {
        /// Index of the term
        index: usize,
    },

    /// Progress could not be displayed
    #[error("cannot display progress")]
    Io(#[from] std::io::Error),
}

/// Print an error and all its causes
pub fn report(err: &dyn Error) {
    eprintln!("Error: {err}");
    let mut source = err.source();
    while let Some(e) = source {
        eprintln!("  caused by: {e}");
        source = e.source();
    }
}

/// Parameters of the random terms
#[derive(Args)]
pub struct GenerationArgs {
    /// Number of operator nodes in each term
    #[arg(long, default_value_t = 50)]
    nb_nodes: usize,

    /// Number of bitvector and Boolean symbols
    #[arg(long, default_value_t = 3)]
    nb_vars: usize,

    /// Width of the bitvector symbols
    #[arg(short = 'w', long, default_value_t = 8)]
    width: u32,

    /// Random seed for term generation
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

impl GenerationArgs {
    fn symbols(&self) -> (Vec<Term>, Vec<Term>) {
        random::symbols(self.nb_vars.max(1), self.width.max(1))
    }
}

fn print_assignment(assignment: &Assignment) {
    for (name, value) in assignment.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
        println!("  {}: {}", name, value);
    }
}

/// Command arguments for checking the simplification engine
#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    generation: GenerationArgs,

    /// Number of random terms to check
    #[arg(short = 'n', long, default_value_t = 100)]
    nb_terms: usize,

    /// Number of random assignments simulated for each term
    #[arg(short = 'p', long, default_value_t = 16)]
    nb_patterns: usize,
}

impl CheckArgs {
    pub fn run(&self) -> Result<(), CommandError> {
        let (bv, bools) = self.generation.symbols();
        let all = [bv.clone(), bools.clone()].concat();
        let mut rng = SmallRng::seed_from_u64(self.generation.seed);
        let mut evaluator = TermEvaluator::new();
        let mut nb_before = 0;
        let mut nb_after = 0;

        let mut progress = tqdm!(total = self.nb_terms);
        progress.set_description("Terms checked");
        for index in 0..self.nb_terms {
            let seed = self.generation.seed.wrapping_add(index as u64);
            let t = random::random_term(&bv, &bools, self.generation.nb_nodes, seed);
            let s = evaluator
                .evaluate(&t, &Default::default())
                .map_err(|source| CommandError::Simplification { index, source })?;
            nb_before += stats(&t).nb_nodes;
            nb_after += stats(&s).nb_nodes;

            let mut sim_t = Simulator::from_term(&t);
            let mut sim_s = Simulator::from_term(&s);
            for _ in 0..self.nb_patterns {
                let assignment = random::assignment(&mut rng, &all);
                let expected = sim_t.run(&assignment)?;
                let actual = sim_s.run(&assignment)?;
                if expected != actual {
                    progress.write(format!("Mismatch on term {index} (seed {seed})"))?;
                    println!("Original: {t}");
                    println!("Simplified: {s}");
                    println!("Assignment:");
                    print_assignment(&assignment);
                    println!("Expected {expected}, got {actual}");
                    return Err(CommandError::Mismatch { index });
                }
            }
            debug!(
                "Term {index}: {} nodes simplified into {}",
                stats(&t).nb_nodes,
                stats(&s).nb_nodes
            );
            progress.set_postfix(format!("nodes={} simplified={}", nb_before, nb_after));
            progress.update(1)?;
        }
        eprintln!();

        let rewriter = evaluator.rewriter();
        info!(
            "All {} terms are equivalent after simplification: {} nodes before, {} after",
            self.nb_terms, nb_before, nb_after
        );
        info!(
            "Nodes folded: {}, rewritten: {}, unchanged: {}",
            rewriter.nb_folded(),
            rewriter.nb_rewritten(),
            rewriter.nb_rebuilt()
        );
        Ok(())
    }
}

/// Command arguments for showing a simplified term
#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    generation: GenerationArgs,
}

impl ShowArgs {
    pub fn run(&self) -> Result<(), CommandError> {
        let (bv, bools) = self.generation.symbols();
        let t = random::random_term(
            &bv,
            &bools,
            self.generation.nb_nodes,
            self.generation.seed,
        );
        let s = bvsimp::simplify::simplify(&t)
            .map_err(|source| CommandError::Simplification { index: 0, source })?;
        println!("Original term:\n{}\n", t);
        println!("Original stats:\n{}\n", stats(&t));
        println!("Simplified term:\n{}\n", s);
        println!("Simplified stats:\n{}\n", stats(&s));
        Ok(())
    }
}
