//! Text dump of resolved call sites.

use std::io::{self, Write};

use gocall_graph::{CallSite, FunctionDescriptor, IndexedProject, InvocationMode, Resolution};

const INDENT: &str = "  ";

/// Descriptors whose identity, qualified name or bare name equals `name`,
/// or every descriptor when `name` is `None`.
pub(crate) fn select_functions<'a>(
    project: &'a IndexedProject,
    name: Option<&str>,
) -> Vec<&'a FunctionDescriptor> {
    project
        .registry()
        .by_file()
        .into_values()
        .flatten()
        .filter(|descriptor| {
            name.is_none_or(|wanted| {
                descriptor.id().to_string() == wanted
                    || descriptor.id().qualified_name() == wanted
                    || descriptor.name() == wanted
            })
        })
        .collect()
}

/// Writes each function header followed by its call sites, nested calls
/// indented one level below the call whose arguments contain them.
///
/// # Errors
///
/// Propagates failures from `out`.
pub(crate) fn write_calls(
    project: &IndexedProject,
    resolution: &Resolution,
    functions: &[&FunctionDescriptor],
    out: &mut impl Write,
) -> io::Result<()> {
    for (index, descriptor) in functions.iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        writeln!(
            out,
            "{} {}:{}",
            descriptor.id(),
            project.relative_path(descriptor.file()),
            descriptor.start_line
        )?;
        let sites = resolution.calls_of(descriptor.id());
        if sites.is_empty() {
            writeln!(out, "{INDENT}(no calls)")?;
        }
        for site in sites {
            write_site(out, site, 1)?;
        }
    }
    Ok(())
}

fn write_site(out: &mut impl Write, site: &CallSite, depth: usize) -> io::Result<()> {
    let indent = INDENT.repeat(depth);
    write!(out, "{indent}{} {} @{}", site.kind.label(), site.kind, site.line)?;
    if site.mode == InvocationMode::Direct {
        writeln!(out)?;
    } else {
        writeln!(out, " [{}]", site.mode.as_str())?;
    }
    for nested in &site.nested {
        write_site(out, nested, depth + 1)?;
    }
    Ok(())
}
