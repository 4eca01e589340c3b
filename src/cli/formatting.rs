//! Console rendering of branch listings.

use std::io::{self, Write};

use termcolor::{Color, ColorSpec, WriteColor};

use crate::data::{Branch, BranchGroups};

const DATE_WIDTH: usize = 25;
const AUTHOR_WIDTH: usize = 25;
const NAME_WIDTH: usize = 75;

fn colour(fg: Color) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(fg));
    spec
}

fn write_coloured(out: &mut dyn WriteColor, spec: &ColorSpec, text: &str) -> io::Result<()> {
    out.set_color(spec)?;
    write!(out, "{text}")?;
    out.reset()
}

fn write_name_and_link(out: &mut dyn WriteColor, branch: &Branch) -> io::Result<()> {
    if branch.issue_url.is_empty() {
        writeln!(out, "{}", branch.pretty_name)
    } else {
        write!(out, "{:<NAME_WIDTH$} ", branch.pretty_name)?;
        write_coloured(out, &colour(Color::Cyan), &branch.issue_url)?;
        writeln!(out)
    }
}

/// Prints one line per branch: date, author, name and issue link.
pub fn print_flat(out: &mut dyn WriteColor, branches: &[Branch]) -> io::Result<()> {
    for branch in branches {
        write_coloured(
            out,
            &colour(Color::Blue),
            &format!("{:<DATE_WIDTH$}", branch.pretty_date),
        )?;
        write!(out, " ")?;
        write_coloured(
            out,
            &colour(Color::Green),
            &format!("{:<AUTHOR_WIDTH$}", branch.author),
        )?;
        write!(out, " ")?;
        write_name_and_link(out, branch)?;
    }
    Ok(())
}

/// Prints a heading per author followed by their branches.
pub fn print_by_author(out: &mut dyn WriteColor, groups: &BranchGroups) -> io::Result<()> {
    for (author, branches) in groups.iter() {
        let mut heading = colour(Color::Green);
        heading.set_underline(true);
        write_coloured(out, &heading, author)?;
        write!(out, " - ")?;
        let mut count = colour(Color::Red);
        count.set_bold(true);
        write_coloured(out, &count, &branches.len().to_string())?;
        writeln!(out)?;
        writeln!(out)?;

        for branch in branches {
            write_coloured(
                out,
                &colour(Color::Magenta),
                &format!("{:<DATE_WIDTH$}", branch.pretty_date),
            )?;
            write!(out, " ")?;
            write_name_and_link(out, branch)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Prints groups in the layout their labels call for.
pub fn print_groups(out: &mut dyn WriteColor, groups: &BranchGroups) -> io::Result<()> {
    if groups.is_by_author() {
        print_by_author(out, groups)
    } else {
        let branches: Vec<Branch> = groups.branches().cloned().collect();
        print_flat(out, &branches)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use termcolor::NoColor;

    use super::*;
    use crate::data::branch::sample_branch;
    use crate::data::Grouping;

    fn fixture() -> Vec<Branch> {
        let mut a = sample_branch("origin/JIRA-1-a", "Bob Jones", "2023-01-01T00:00:00+00:00");
        a.pretty_date = "2 years ago".to_string();
        a.issue_url = "https://jira/browse/JIRA-1".to_string();
        let mut b = sample_branch("origin/b", "Anna Smith", "2024-01-01T00:00:00+00:00");
        b.pretty_date = "10 months ago".to_string();
        vec![a, b]
    }

    fn render(groups: &BranchGroups) -> String {
        let mut out = NoColor::new(Vec::new());
        print_groups(&mut out, groups).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn flat_listing_pads_columns() {
        let output = render(&Grouping::None.apply(fixture()));
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("2 years ago               Bob Jones                 JIRA-1-a "));
        assert!(lines[0].ends_with(" https://jira/browse/JIRA-1"));
        assert_eq!(lines[1], "10 months ago             Anna Smith                b");
    }

    #[test]
    fn author_listing_has_headings() {
        let output = render(&Grouping::ByAuthor.apply(fixture()));
        insta::assert_snapshot!(output.trim_end(), @r"
        Anna Smith - 1

        10 months ago             b

        Bob Jones - 1

        2 years ago               JIRA-1-a                                                                    https://jira/browse/JIRA-1
        ");
    }
}
