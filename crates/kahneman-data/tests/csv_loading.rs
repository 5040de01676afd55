//! CSV round trips through the polars reader.

use kahneman_data::{BenchmarkFactors, BenchmarkSchema, Panel, PanelSchema, Period};
use std::fs;
use std::path::PathBuf;

fn write_temp(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("kahneman-data-{}-{}", std::process::id(), name));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_panel_csv() {
    let path = write_temp(
        "panel.csv",
        "permno,yyyymm,year,month,ret,ind,1m.lret,s,bm,size\n\
         10001,200101,2001,1,1.2,10,0.5,0,0.4,5.1\n\
         10001,200102,2001,2,,10,0.2,0,0.5,5.2\n\
         10002,200101,2001,1,-3.1,20,-1.0,1,,4.0\n",
    );
    let panel = Panel::load_csv(&path, PanelSchema::default()).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(panel.len(), 3);
    assert_eq!(panel.feature_names(), &["bm".to_string(), "size".to_string()]);
    assert_eq!(panel.periods(), vec![
        Period::from_yyyymm(200101).unwrap(),
        Period::from_yyyymm(200102).unwrap(),
    ]);
    assert_eq!(panel.observations()[1].ret, None);
    assert_eq!(panel.observations()[2].industry.as_deref(), Some("20"));
    assert_eq!(panel.split(1).len(), 1);
}

#[test]
fn test_load_benchmark_csv() {
    let path = write_temp(
        "ff.csv",
        "date,mkt_rf,SMB,HML,Mom\n\
         2001-01-01,3.1,0.2,-0.4,1.0\n\
         2001-02-01,-1.0,0.1,0.3,-2.0\n",
    );
    let factors = BenchmarkFactors::load_csv(&path, &BenchmarkSchema::default()).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(factors.len(), 2);
    let feb = factors
        .for_period(Period::from_yyyymm(200102).unwrap())
        .and_then(|row| row.complete())
        .unwrap();
    assert_eq!(feb, [-1.0, 0.1, 0.3, -2.0]);
}
