use insta_cmd::assert_cmd_snapshot;

use crate::{PACKAGE_TREE, TestCase};

#[test]
fn doc_and_members() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;

    assert_cmd_snapshot!(case.command().args(["-M", "pkg", "-c", "doc", "members"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg: The package.
    pkg
    pkg.a: Module a.
    pkg.a: first, Thing
    pkg.b
    pkg.b
    pkg.sub
    pkg.sub
    pkg.sub.c
    pkg.sub.c: helper

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn json() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;

    assert_cmd_snapshot!(case.command().args(["-m", "pkg", "-c", "json"]), @r#"
    success: true
    exit_code: 0
    ----- stdout -----
    {"name":"pkg","path":"<temp_dir>/pkg/__init__.py","kind":"package","source":"source","docstring":"The package.","functions":[],"classes":[]}

    ----- stderr -----
    "#);

    Ok(())
}

#[test]
fn filters_skip_remaining_callbacks() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;
    case.write_files([("pkg/_private.py", ""), ("pkg/_inner/__init__.py", "")])?;

    assert_cmd_snapshot!(case.command().args(["-M", "pkg", "-c", "skip_private", "packages_only", "print"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg
    pkg.sub

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn clear_drops_earlier_callbacks() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;

    assert_cmd_snapshot!(case.command().args(["-M", "pkg.sub", "-c", "doc", "-C", "-c", "path"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    <temp_dir>/pkg/sub/__init__.py
    <temp_dir>/pkg/sub/c.py

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn clear_alone_leaves_no_callbacks() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;

    assert_cmd_snapshot!(case.command().args(["-M", "pkg", "-c", "print", "-C"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn qualified_callback_names() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;

    assert_cmd_snapshot!(case.command().args(["-m", "pkg.b", "-c", "modwalk.print", ".path"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg.b
    <temp_dir>/pkg/b.py

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn unknown_callback_aborts() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;

    assert_cmd_snapshot!(case.command().args(["-M", "pkg", "-c", "shout"]), @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    modwalk failed
      Cause: Failed to load a requested callback
      Cause: unknown callback `shout` (available: doc, json, members, modules_only, packages_only, path, print, skip_private)
    ");

    Ok(())
}

#[test]
fn unknown_callback_is_skipped_when_ignored() -> anyhow::Result<()> {
    let case = TestCase::with_files(PACKAGE_TREE)?;

    assert_cmd_snapshot!(case.command().args(["-i", "-m", "pkg", "-c", "os.shout", "print"]), @r#"
    success: true
    exit_code: 0
    ----- stdout -----
    pkg

    ----- stderr -----
    ERROR unable to load "os.shout" (skipping)
    "#);

    Ok(())
}
