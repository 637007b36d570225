use std::path::Path;

use pgkeep::application::schedule::{self, CronPlan, CronVariant};
use pgkeep::testkit::crontab::MemoryCrontab;

fn plan() -> CronPlan {
    CronPlan::new("/home/bot/bin/pgkeep", "/home/bot/app/.env")
        .with_log_file("/home/bot/app/backups/pgkeep-cron.log")
}

#[test]
fn running_the_installer_twice_installs_each_schedule_once() {
    let store = MemoryCrontab::with("SHELL=/bin/bash\n@reboot /home/bot/app/start.sh\n");

    schedule::install(&store, &plan()).unwrap();
    schedule::install(&store, &plan()).unwrap();

    let contents = store.contents();
    let managed: Vec<&str> = contents
        .lines()
        .filter(|line| line.contains("/home/bot/bin/pgkeep"))
        .collect();
    assert_eq!(managed.len(), 2, "{contents}");
    assert!(managed[0].starts_with("0 */6 * * * "));
    assert!(managed[0]
        .contains("cd /home/bot/app && /home/bot/bin/pgkeep --env-file /home/bot/app/.env"));
    assert!(managed[0].contains("backup --no-notify"));
    assert!(managed[0].ends_with("# pgkeep:fast"));
    assert!(managed[1].starts_with("0 3 * * * "));
    assert!(managed[1].contains("backup --notify --upload"));
    assert!(managed[1].ends_with("# pgkeep:notify"));
    assert!(contents.starts_with("SHELL=/bin/bash\n@reboot /home/bot/app/start.sh\n"));
}

#[test]
fn hand_written_line_without_marker_does_not_block_install() {
    let store = MemoryCrontab::with("0 1 * * * /home/bot/bin/pgkeep backup\n");

    let report = schedule::install(&store, &plan()).unwrap();

    assert_eq!(report.installed, CronVariant::ALL.to_vec());
    assert_eq!(store.contents().lines().count(), 3);
}

#[test]
fn uninstall_then_install_round_trip() {
    let store = MemoryCrontab::default();
    schedule::install(&store, &plan()).unwrap();

    let removed = schedule::uninstall(&store, Path::new("/home/bot/bin/pgkeep")).unwrap();
    assert_eq!(removed, 2);
    assert!(store.contents().trim().is_empty());

    let report = schedule::install(&store, &plan()).unwrap();
    assert_eq!(report.installed.len(), 2);
}

#[test]
fn custom_schedules_are_rendered() {
    let plan = plan()
        .with_schedule(CronVariant::Fast, "*/30 * * * *")
        .unwrap()
        .with_schedule(CronVariant::Notify, "15 4 * * *")
        .unwrap();

    let entries = plan.entries();
    assert_eq!(entries[0].schedule, "*/30 * * * *");
    assert_eq!(entries[1].schedule, "15 4 * * *");
}
