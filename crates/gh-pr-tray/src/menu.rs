//! Entry rendering
//!
//! A cycle describes what it wants to show as a [`MenuPlan`] and hands it to
//! [`present`], which rebuilds the [`EntrySelector`] and replays the plan on
//! the [`MenuSurface`]. The returned actions are indexed like the entry
//! sources, so a [`Selection::Entry`](crate::selector::Selection) maps
//! straight to what the user picked.

use crate::cancel::Canceled;
use crate::domain_models::{BuildStatus, PrGroups, PullRequest, UserPrs};
use crate::selector::{EntrySelector, EntrySource};
use tokio_util::sync::CancellationToken;

pub const FETCHING_LABEL: &str = "Fetching PRs from GitHub...";
pub const FETCH_FAILED_LABEL: &str = "Could not fetch PRs, retrying later";
pub const NO_OWN_PRS_LABEL: &str = "No PRs out from you – yet";
pub const NO_REVIEWS_LABEL: &str = "No PRs to review, no news is good news.";
pub const SETUP_ENTRY: &str = "GitHub setup";
pub const QUIT_ENTRY: &str = "Quit";

/// Display collaborator, the tray menu or a stand-in for it
pub trait MenuSurface: Send + Sync {
    /// Remove every item
    fn reset(&self);

    /// Append a disabled, non-selectable line
    fn add_label(&self, text: &str);

    /// Append a selectable entry that fires `source` when clicked
    fn add_entry(&self, text: &str, source: EntrySource);

    fn add_separator(&self);

    /// Called once after a complete plan has been applied
    fn flush(&self) {}
}

/// What a selectable entry stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryAction {
    StartSetup,
    Quit,
    Open(PullRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Label(String),
    Entry(String, EntryAction),
    Separator,
}

/// Ordered items of one rendering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuPlan {
    items: Vec<MenuItem>,
}

impl MenuPlan {
    /// Shown while unauthenticated
    pub fn setup() -> Self {
        Self {
            items: vec![
                MenuItem::Entry(SETUP_ENTRY.to_string(), EntryAction::StartSetup),
                MenuItem::Entry(QUIT_ENTRY.to_string(), EntryAction::Quit),
            ],
        }
    }

    /// A status line, with Quit kept reachable
    pub fn status(text: &str) -> Self {
        Self {
            items: vec![
                MenuItem::Label(text.to_string()),
                MenuItem::Separator,
                MenuItem::Entry(QUIT_ENTRY.to_string(), EntryAction::Quit),
            ],
        }
    }

    /// Both PR buckets, each group under its repository header
    pub fn listing(prs: &UserPrs) -> Self {
        let mut items = Vec::new();
        push_groups(&mut items, &prs.mine, NO_OWN_PRS_LABEL);
        items.push(MenuItem::Separator);
        push_groups(&mut items, &prs.others, NO_REVIEWS_LABEL);
        items.push(MenuItem::Separator);
        items.push(MenuItem::Entry(QUIT_ENTRY.to_string(), EntryAction::Quit));
        Self { items }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Number of selectable entries
    pub fn entry_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, MenuItem::Entry(..)))
            .count()
    }
}

fn push_groups(items: &mut Vec<MenuItem>, groups: &PrGroups, empty_label: &str) {
    if groups.is_empty() {
        items.push(MenuItem::Label(empty_label.to_string()));
        return;
    }
    for (repo, prs) in groups.iter() {
        items.push(MenuItem::Label(repo.to_string()));
        for pr in prs {
            items.push(MenuItem::Entry(pr_label(pr), EntryAction::Open(pr.clone())));
        }
    }
}

/// `<merge marker><build marker> <title>`
pub fn pr_label(pr: &PullRequest) -> String {
    let merge = if pr.mergeable { "✅" } else { "❌" };
    let build = match pr.build_status {
        BuildStatus::Success => "🟢",
        BuildStatus::Failure => "🔴",
        BuildStatus::Canceled => "⚪",
        BuildStatus::Pending => "🔵",
    };
    format!("{}{} {}", merge, build, pr.title)
}

/// Replace the rendered entry set with `plan`
///
/// Nothing is touched once `cancel` has fired, so a superseded cycle never
/// mutates the display.
pub fn present(
    surface: &dyn MenuSurface,
    cancel: &CancellationToken,
    selector: &mut EntrySelector,
    plan: MenuPlan,
) -> Result<Vec<EntryAction>, Canceled> {
    if cancel.is_cancelled() {
        return Err(Canceled);
    }

    let mut sources = selector.rebuild(plan.entry_count()).into_iter();
    let mut actions = Vec::with_capacity(plan.entry_count());

    surface.reset();
    for item in plan.items {
        match item {
            MenuItem::Label(text) => surface.add_label(&text),
            MenuItem::Separator => surface.add_separator(),
            MenuItem::Entry(text, action) => {
                // entry_count() sized the sources to match
                if let Some(source) = sources.next() {
                    surface.add_entry(&text, source);
                    actions.push(action);
                }
            }
        }
    }
    surface.flush();

    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selection;
    use crate::test_support::{MenuOp, RecordingMenu};
    use pretty_assertions::assert_eq;

    fn pr(url: &str, title: &str, mergeable: bool, build_status: BuildStatus) -> PullRequest {
        PullRequest::new(url, title, mergeable, build_status)
    }

    #[test]
    fn test_pr_label_markers() {
        assert_eq!(
            pr_label(&pr("u", "Fix it", true, BuildStatus::Success)),
            "✅🟢 Fix it"
        );
        assert_eq!(
            pr_label(&pr("u", "Fix it", false, BuildStatus::Failure)),
            "❌🔴 Fix it"
        );
        assert_eq!(
            pr_label(&pr("u", "Fix it", false, BuildStatus::Canceled)),
            "❌⚪ Fix it"
        );
        assert_eq!(
            pr_label(&pr("u", "Fix it", true, BuildStatus::Pending)),
            "✅🔵 Fix it"
        );
    }

    #[test]
    fn test_listing_layout() {
        let mut prs = UserPrs::default();
        prs.mine.push("me/tool", pr("u1", "One", true, BuildStatus::Success));
        prs.mine.push("me/tool", pr("u2", "Two", false, BuildStatus::Pending));
        prs.others.push("them/lib", pr("u3", "Three", true, BuildStatus::Failure));

        let plan = MenuPlan::listing(&prs);

        assert_eq!(
            plan.items().to_vec(),
            vec![
                MenuItem::Label("me/tool".to_string()),
                MenuItem::Entry(
                    "✅🟢 One".to_string(),
                    EntryAction::Open(pr("u1", "One", true, BuildStatus::Success))
                ),
                MenuItem::Entry(
                    "❌🔵 Two".to_string(),
                    EntryAction::Open(pr("u2", "Two", false, BuildStatus::Pending))
                ),
                MenuItem::Separator,
                MenuItem::Label("them/lib".to_string()),
                MenuItem::Entry(
                    "✅🔴 Three".to_string(),
                    EntryAction::Open(pr("u3", "Three", true, BuildStatus::Failure))
                ),
                MenuItem::Separator,
                MenuItem::Entry("Quit".to_string(), EntryAction::Quit),
            ]
        );
        assert_eq!(plan.entry_count(), 4);
    }

    #[test]
    fn test_empty_listing_uses_placeholders() {
        let plan = MenuPlan::listing(&UserPrs::default());

        assert_eq!(
            plan.items().to_vec(),
            vec![
                MenuItem::Label(NO_OWN_PRS_LABEL.to_string()),
                MenuItem::Separator,
                MenuItem::Label(NO_REVIEWS_LABEL.to_string()),
                MenuItem::Separator,
                MenuItem::Entry("Quit".to_string(), EntryAction::Quit),
            ]
        );
        assert_eq!(plan.entry_count(), 1);
    }

    #[tokio::test]
    async fn test_present_wires_entries_to_selector() {
        let menu = RecordingMenu::new();
        let mut selector = EntrySelector::new();

        let actions = present(
            menu.as_ref(),
            &CancellationToken::new(),
            &mut selector,
            MenuPlan::setup(),
        )
        .unwrap();

        assert_eq!(actions, vec![EntryAction::StartSetup, EntryAction::Quit]);
        assert_eq!(
            menu.ops(),
            vec![
                MenuOp::Reset,
                MenuOp::Entry("GitHub setup".to_string()),
                MenuOp::Entry("Quit".to_string()),
            ]
        );

        assert!(menu.click("Quit"));
        assert_eq!(selector.select_first().await, Selection::Entry(1));
    }

    #[test]
    fn test_present_after_cancel_touches_nothing() {
        let menu = RecordingMenu::new();
        let mut selector = EntrySelector::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = present(menu.as_ref(), &cancel, &mut selector, MenuPlan::setup());

        assert_eq!(result, Err(Canceled));
        assert!(menu.ops().is_empty());
        assert!(selector.is_empty());
    }
}
