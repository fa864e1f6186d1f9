use crate::index::arena::Arena;
use crate::index::reader::SuffixIndex;
use crate::index::types::{TreeStats, edges_path, meta_path, nodes_path};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Count nodes, edges and label storage of an arena
pub fn compute(arena: &Arena) -> TreeStats {
    let mut stats = TreeStats {
        nodes: arena.node_count(),
        edges: arena.edge_count(),
        keys: arena.root().ids().len(),
        ..TreeStats::default()
    };
    for node in arena.nodes() {
        if node.is_leaf() {
            stats.leaves += 1;
        }
        stats.max_fanout = stats.max_fanout.max(node.edges().len());
    }
    stats.label_bytes = arena.edges().iter().map(|e| e.label().len()).sum();
    stats
}

/// Display statistics for the index stored at `base`
pub fn show_stats(base: &Path) -> Result<()> {
    let stdout = std::io::stdout();
    write_stats(&mut stdout.lock(), base)
}

/// Write the statistics report for the index stored at `base`
pub fn write_stats<W: Write>(out: &mut W, base: &Path) -> Result<()> {
    let index = SuffixIndex::open(base)
        .with_context(|| format!("Failed to open index {}", base.display()))?;
    let meta = index.meta();
    let stats = index.stats();

    writeln!(out, "Index Statistics")?;
    writeln!(out, "================")?;
    writeln!(out)?;
    writeln!(out, "Base path:        {}", base.display())?;
    writeln!(out, "Format version:   {}", meta.version)?;
    // without a sidecar only the root's id set survives
    if meta_path(base).is_file() {
        writeln!(out, "Propagation:      {:?}", meta.propagation)?;
        writeln!(out, "Keys inserted:    {}", meta.key_count)?;
    } else {
        writeln!(out, "Keys inserted:    unknown (no metadata)")?;
    }
    writeln!(out, "Distinct ids:     {}", stats.keys)?;
    writeln!(out, "Last id:          {}", meta.last_id)?;
    writeln!(out)?;
    writeln!(out, "Nodes:            {}", stats.nodes)?;
    writeln!(out, "  leaves:         {}", stats.leaves)?;
    writeln!(out, "  internal:       {}", stats.nodes - stats.leaves)?;
    writeln!(out, "Edges:            {}", stats.edges)?;
    writeln!(out, "Max fan-out:      {}", stats.max_fanout)?;
    writeln!(out, "Label bytes:      {}", format_size(stats.label_bytes as u64))?;

    let size: u64 = [edges_path(base), nodes_path(base), meta_path(base)]
        .iter()
        .filter_map(|p| std::fs::metadata(p).ok())
        .map(|m| m.len())
        .sum();
    writeln!(out)?;
    writeln!(out, "Index size:       {}", format_size(size))?;

    if meta.created_at > 0 {
        writeln!(out, "Created:          {}", format_timestamp(meta.created_at))?;
    }

    Ok(())
}

/// Format byte size to human readable
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

fn format_timestamp(ts: u64) -> String {
    use std::time::{Duration, UNIX_EPOCH};
    format!("{:?}", UNIX_EPOCH + Duration::from_secs(ts))
}
