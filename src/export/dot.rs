//! Graphviz DOT files, one per tree

use crate::assemble::{SpanningForest, SpanningTree};
use crate::universe::{Context, TreeIndex};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// `Tn_{t}.dot`
pub fn dot_file_name(t: TreeIndex) -> String {
    format!("Tn_{}.dot", t)
}

/// Write one tree as a top-down digraph with permutation labels
pub fn write_tree_dot<W: Write>(ctx: &Context, tree: &SpanningTree, out: &mut W) -> crate::Result<()> {
    let universe = ctx.universe();
    writeln!(out, "digraph T{}_{} {{", ctx.n(), tree.index())?;
    writeln!(out, "  rankdir=TB;")?;
    for (parent, child) in tree.edges() {
        writeln!(
            out,
            "  \"{}\" -> \"{}\";",
            universe.label(parent),
            universe.label(child)
        )?;
    }
    writeln!(out, "}}")?;
    Ok(())
}

/// Write every tree of `forest` under `dir`, returning the paths written
pub fn export_dot(ctx: &Context, forest: &SpanningForest, dir: &Path) -> crate::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    info!("Writing {} DOT files to {}", forest.trees().len(), dir.display());

    forest
        .trees()
        .par_iter()
        .map(|tree| -> crate::Result<PathBuf> {
            let path = dir.join(dot_file_name(tree.index()));
            let mut out = BufWriter::new(File::create(&path)?);
            write_tree_dot(ctx, tree, &mut out)?;
            out.flush()?;
            Ok(path)
        })
        .collect()
}
