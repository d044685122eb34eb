//! Integrity checker: compare the manifest with the links on disk.
use crate::error::Result;
use crate::manifest::LinkType;
use crate::resources::{LinkResource, LinkState};

use super::{Context, Roots};

/// One line of the status report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    /// Relative entry path.
    pub path: String,
    /// Absolute local path.
    pub local: String,
    /// Absolute remote path.
    pub remote: String,
    /// Entry link type.
    pub link_type: LinkType,
    /// Observed state.
    pub state: LinkState,
}

/// Classify every manifest entry.  Never modifies anything; mismatches are
/// reported in [`StatusRow::state`].
///
/// # Errors
///
/// Returns an error only if the manifest cannot be loaded or its roots
/// cannot be resolved.
pub fn status(ctx: &Context<'_>) -> Result<Vec<StatusRow>> {
    let manifest = ctx.store.load()?;
    if manifest.entries.is_empty() {
        return Ok(Vec::new());
    }
    let roots = Roots::resolve(&manifest, ctx.settings)?;

    Ok(manifest
        .entries
        .iter()
        .map(|entry| {
            let res = LinkResource::for_entry(entry, &roots.local, &roots.remote);
            ctx.log.debug(&format!("checking {}", res.description()));
            StatusRow {
                path: entry.path.clone(),
                local: res.target.display().to_string(),
                remote: res.source.display().to_string(),
                link_type: entry.link_type,
                state: res.state(),
            }
        })
        .collect())
}

/// Render rows as an aligned table with a header and separator line.
#[must_use]
pub fn render_table(rows: &[StatusRow]) -> Vec<String> {
    const HEADERS: [&str; 4] = ["Local Path", "Remote Path", "Type", "Status"];

    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|r| {
            [
                r.local.clone(),
                r.remote.clone(),
                r.link_type.to_string(),
                r.state.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cols: [&str; 4]| -> String {
        let line = cols
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ");
        line.trim_end().to_string()
    };

    let header = format_row(HEADERS);
    let separator_len = widths.iter().sum::<usize>() + 2 * (HEADERS.len() - 1);
    let mut lines = vec![header, "-".repeat(separator_len)];
    lines.extend(cells.iter().map(|row| {
        format_row([
            row[0].as_str(),
            row[1].as_str(),
            row[2].as_str(),
            row[3].as_str(),
        ])
    }));
    lines
}


#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod fs_tests {
    use super::*;
    use crate::engine::add::add;
    use crate::engine::testing::Fixture;
    use crate::manifest::{Manifest, store::MockManifestStore};

    #[test]
    fn reports_linked_and_missing() {
        let fx = Fixture::new();
        fx.write_local("a.txt", "a");
        fx.write_local("b.txt", "b");
        add(&fx.ctx(), "a.txt", false, Some(LinkType::Symbolic)).unwrap();
        add(&fx.ctx(), "b.txt", false, Some(LinkType::Hard)).unwrap();
        std::fs::remove_file(fx.local.join("b.txt")).unwrap();

        let rows = status(&fx.ctx()).unwrap();
        assert_eq!(rows[0].state, LinkState::Linked);
        assert_eq!(rows[1].state, LinkState::LinkNotFound);
    }

    #[test]
    fn wrong_target_is_reported_not_raised() {
        let fx = Fixture::new();
        fx.write_local("a.txt", "a");
        add(&fx.ctx(), "a.txt", false, Some(LinkType::Symbolic)).unwrap();
        std::fs::write(fx.remote.join("other.txt"), b"o").unwrap();
        std::fs::remove_file(fx.local.join("a.txt")).unwrap();
        std::os::unix::fs::symlink(fx.remote.join("other.txt"), fx.local.join("a.txt")).unwrap();

        let rows = status(&fx.ctx()).unwrap();
        assert_eq!(
            rows[0].state.to_string(),
            format!(
                "Wrong target: {} (expected: {})",
                fx.remote.join("other.txt").display(),
                fx.remote.join("a.txt").display()
            )
        );
    }

    #[test]
    fn status_never_saves() {
        let fx = Fixture::new();
        fx.write_local("a.txt", "a");
        add(&fx.ctx(), "a.txt", false, None).unwrap();
        let loaded: Manifest = fx.manifest();

        let mut store = MockManifestStore::new();
        store.expect_load().times(1).returning(move || Ok(loaded.clone()));
        store.expect_save().never();
        let ctx = Context::new(&store, &fx.settings, &fx.log);

        assert_eq!(status(&ctx).unwrap().len(), 1);
    }
}
