use modwalk::{ExitStatus, modwalk_main};

fn main() -> ExitStatus {
    modwalk_main(|args| args)
}
