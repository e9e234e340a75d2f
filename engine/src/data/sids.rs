use std::sync::LazyLock;

use serde::Serialize;

use super::fixes::{Waypoint, WaypointKind, ZRZ, from_arp, from_zrz};

/// A published standard instrument departure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sid {
  pub designator: &'static str,
  pub name: &'static str,
  pub runways: &'static [&'static str],
  pub description: &'static str,
  pub fixes: Vec<Waypoint>,
  pub final_altitude: f64,
  pub restrictions: &'static [&'static str],
  pub military: bool,
}

impl Sid {
  pub fn serves_runway(&self, runway: &str) -> bool {
    self.runways.iter().any(|r| r.eq_ignore_ascii_case(runway))
  }
}

const RWY_30: &[&str] = &["30R", "30L"];
const RWY_12: &[&str] = &["12L", "12R"];

fn fix(name: &str, radial: f64, distance: f64) -> Waypoint {
  Waypoint::new(name, WaypointKind::Fix, from_arp(radial, distance))
}

fn vor(name: &str, radial: f64, distance: f64) -> Waypoint {
  Waypoint::new(name, WaypointKind::VorDme, from_arp(radial, distance))
}

fn zrz() -> Waypoint {
  Waypoint::new("ZRZ", WaypointKind::Ndb, ZRZ)
}

fn festa() -> Waypoint {
  Waypoint::new("FESTA", WaypointKind::Fix, from_zrz(167.0, 30.0))
}

fn burov() -> Waypoint {
  fix("BUROV", 117.0, 8.0)
}

fn embex() -> Waypoint {
  fix("EMBEX", 334.0, 19.6)
}

fn ton() -> Waypoint {
  fix("TON", 60.0, 29.0)
}

fn graus() -> Waypoint {
  fix("GRAUS", 75.0, 66.7)
}

fn mario() -> Waypoint {
  fix("MARIO", 46.0, 48.4)
}

fn surco() -> Waypoint {
  fix("SURCO", 27.0, 45.3)
}

fn ponen() -> Waypoint {
  fix("PONEN", 133.0, 29.4)
}

fn mla() -> Waypoint {
  vor("MLA", 122.0, 62.6)
}

fn cma() -> Waypoint {
  vor("CMA", 192.0, 56.5)
}

fn bardenas() -> Waypoint {
  fix("BARDENAS", 333.0, 36.0)
}

fn victor() -> Waypoint {
  fix("VICTOR", 67.0, 20.0)
}

fn tango() -> Waypoint {
  fix("TANGO", 140.0, 35.0)
}

fn zulu() -> Waypoint {
  fix("ZULU", 248.0, 28.0)
}

pub static SIDS: LazyLock<Vec<Sid>> = LazyLock::new(|| {
  vec![
    Sid {
      designator: "ALEPO2B",
      name: "ALEPO TWO BRAVO",
      runways: RWY_30,
      description: "Climb runway heading to ZRZ (2000 ft min). Turn right 317° to ALEPO (FL100 min).",
      fixes: vec![zrz(), fix("ALEPO", 317.0, 57.7)],
      final_altitude: 24000.0,
      restrictions: &["Subject to LED107 activity"],
      military: false,
    },
    Sid {
      designator: "CMA2E",
      name: "CMA TWO ECHO",
      runways: RWY_30,
      description: "Climb runway heading to ZRZ. Turn left 167° to FESTA (4000 ft min). Turn right R-014 to CMA (FL100 min).",
      fixes: vec![zrz(), festa(), cma()],
      final_altitude: 23000.0,
      restrictions: &[],
      military: false,
    },
    Sid {
      designator: "GRAUS1M",
      name: "GRAUS ONE MIKE",
      runways: RWY_30,
      description: "Climb runway heading to ZRZ. Turn right 355° to EMBEX. Turn right 093° to TON. Turn left 085° to GRAUS.",
      fixes: vec![zrz(), embex(), ton(), graus()],
      final_altitude: 20000.0,
      restrictions: &[],
      military: false,
    },
    Sid {
      designator: "MARIO1D",
      name: "MARIO ONE DELTA",
      runways: RWY_30,
      description: "Climb runway heading to ZRZ. Turn right 355° to EMBEX. Turn right 093° to TON. Turn left 035° to MARIO.",
      fixes: vec![zrz(), embex(), ton(), mario()],
      final_altitude: 24000.0,
      restrictions: &[],
      military: false,
    },
    Sid {
      designator: "PONEN1B",
      name: "PONEN ONE BRAVO",
      runways: RWY_30,
      description: "Climb runway heading to ZRZ. Turn left to 10 DME arc. Follow arc to R-293 MLA to PONEN (6500 ft min).",
      fixes: vec![zrz(), ponen(), mla()],
      final_altitude: 18000.0,
      restrictions: &["Minimum climb gradient 5.7% up to 6500 ft"],
      military: false,
    },
    Sid {
      designator: "SURCO1D",
      name: "SURCO ONE DELTA",
      runways: RWY_30,
      description: "Climb runway heading to ZRZ. Turn right 355° to EMBEX. Turn right 058° to follow R-027 to SURCO.",
      fixes: vec![zrz(), embex(), surco()],
      final_altitude: 24000.0,
      restrictions: &[],
      military: false,
    },
    Sid {
      designator: "SURCO1E",
      name: "SURCO ONE ECHO",
      runways: RWY_30,
      description: "Climb runway heading to ZRZ. Turn right 355° to EMBEX. Turn right 093° to TON. Turn left 354° to SURCO.",
      fixes: vec![zrz(), embex(), ton(), surco()],
      final_altitude: 24000.0,
      restrictions: &[],
      military: false,
    },
    Sid {
      designator: "CMA3D",
      name: "CALAMOCHA THREE DELTA",
      runways: RWY_12,
      description: "Climb R-117 ZAR to BUROV (2000 ft min). Turn right heading 228° to R-014 CMA to FESTA (4000 ft min). Follow R-014 CMA to CMA (FL100 min).",
      fixes: vec![burov(), festa(), cma()],
      final_altitude: 23000.0,
      restrictions: &[
        "Cross BUROV at 2000 ft or above",
        "Cross FESTA at 4000 ft or above",
      ],
      military: false,
    },
    Sid {
      designator: "GRAUS2H",
      name: "GRAUS TWO HOTEL",
      runways: RWY_12,
      description: "Climb R-117 ZAR to BUROV (2000 ft min). Turn left track 039° TON to TON (TRL or above). Turn right track 085° to GRAUS.",
      fixes: vec![burov(), ton(), graus()],
      final_altitude: 20000.0,
      restrictions: &["Cross BUROV at 2000 ft or above"],
      military: false,
    },
    Sid {
      designator: "MARIO2C",
      name: "MARIO TWO CHARLIE",
      runways: RWY_12,
      description: "Climb R-117 ZAR to BUROV (2000 ft min). Turn left track 039° TON to TON (TRL or above). Turn left track 035° to MARIO.",
      fixes: vec![burov(), ton(), mario()],
      final_altitude: 24000.0,
      restrictions: &["Cross BUROV at 2000 ft or above"],
      military: false,
    },
    Sid {
      designator: "PONEN2A",
      name: "PONEN TWO ALPHA",
      runways: RWY_12,
      description: "Climb R-117 ZAR to BUROV (2000 ft min). Heading 134° to intercept R-293 MLA to PONEN.",
      fixes: vec![burov(), ponen(), mla()],
      final_altitude: 18000.0,
      restrictions: &["Cross BUROV at 2000 ft or above"],
      military: false,
    },
    Sid {
      designator: "SURCO2C",
      name: "SURCO TWO CHARLIE",
      runways: RWY_12,
      description: "Climb R-117 ZAR to BUROV (2000 ft min). Turn left track 039° TON to TON (TRL or above). Turn left track 354° to SURCO.",
      fixes: vec![burov(), ton(), surco()],
      final_altitude: 24000.0,
      restrictions: &["Cross BUROV at 2000 ft or above"],
      military: false,
    },
    Sid {
      designator: "BARDENAS_RWY12",
      name: "BARDENAS DEPARTURE",
      runways: RWY_12,
      description: "Climb R-122 ZZA to 10 DME (4000 ft max). Turn left heading 036° to R-091 (5000 ft min). Arc 20 DME to VICTOR (FL070 min). Heading 293° to R-343/26 DME. Direct to BARDENAS.",
      fixes: vec![
        fix("10DME_122", 122.0, 10.0),
        fix("R091_INT", 91.0, 15.0),
        victor(),
        bardenas(),
      ],
      final_altitude: 24000.0,
      restrictions: &[
        "Cross 10 DME at 4000 ft or below",
        "Cross R-091 at 5000 ft or above",
        "Max speed 280 kt over BARDENAS between 6000-FL080",
      ],
      military: true,
    },
    Sid {
      designator: "TANGO_RWY12",
      name: "TANGO DEPARTURE",
      runways: RWY_12,
      description: "Climb R-122 ZZA to 9.4 DME (2500 ft min). Turn right heading 177° to R-140 (4000 ft min). Direct to TANGO (FL080 min). Follow R-288 MLA to MLA.",
      fixes: vec![
        fix("9.4DME_122", 122.0, 9.4),
        fix("R140_INT", 140.0, 18.0),
        tango(),
        mla(),
      ],
      final_altitude: 24000.0,
      restrictions: &[
        "Cross 9.4 DME at 2500 ft or above",
        "Cross R-140 at 4000 ft or above",
        "Cross TANGO at FL080 or above",
      ],
      military: true,
    },
    Sid {
      designator: "BARDENAS_RWY30",
      name: "BARDENAS DEPARTURE",
      runways: RWY_30,
      description: "Climb R-302 ZZA to 10 DME (4000 ft max). Turn right heading 002° to R-343/26 DME. Turn left direct to BARDENAS.",
      fixes: vec![
        fix("10DME_302", 302.0, 10.0),
        fix("R343_26DME", 343.0, 26.0),
        bardenas(),
      ],
      final_altitude: 24000.0,
      restrictions: &[
        "Cross 10 DME at 4000 ft or below",
        "Max speed 280 kt over BARDENAS between 6000-FL080",
      ],
      military: true,
    },
    Sid {
      designator: "TANGO_RWY30",
      name: "TANGO DEPARTURE",
      runways: RWY_30,
      description: "Climb R-302 ZZA to 5 DME (1700 ft min). Turn left heading 167°. Cross R-272 (3100 ft min). Direct to FESTA (FL070 min). Heading 107° to TANGO (FL080 min). Follow R-288 MLA to MLA.",
      fixes: vec![
        fix("5DME_302", 302.0, 5.0),
        fix("R272_INT", 272.0, 12.0),
        fix("FESTA", 188.0, 14.2),
        tango(),
        mla(),
      ],
      final_altitude: 24000.0,
      restrictions: &[
        "Cross 5 DME at 1700 ft or above",
        "Cross R-272 at 3100 ft or above",
        "Cross FESTA at FL070 or above",
        "Cross TANGO at FL080 or above",
      ],
      military: true,
    },
    Sid {
      designator: "VICTOR_RWY30",
      name: "VICTOR DEPARTURE",
      runways: RWY_30,
      description: "Climb R-324 ZZA to 20 DME (FL080 min). Turn right arc 20 DME to VICTOR. Turn left track 099° TON to TON. Turn left track 085° to GRAUS.",
      fixes: vec![fix("20DME_324", 324.0, 20.0), victor(), ton(), graus()],
      final_altitude: 20000.0,
      restrictions: &["Cross 20 DME at FL080 or above"],
      military: true,
    },
    Sid {
      designator: "ZULU_RWY12",
      name: "ZULU DEPARTURE",
      runways: RWY_12,
      description: "Climb R-123 ZZA to 9.4 DME (2500 ft min). Turn right heading 282° to R-149 (3100 ft min). Intercept R-248/15 DME (4300 ft min). Direct to ZULU (FL080 min).",
      fixes: vec![
        fix("9.4DME_123", 123.0, 9.4),
        fix("R149_INT", 149.0, 14.0),
        fix("R248_15DME", 248.0, 15.0),
        zulu(),
      ],
      final_altitude: 24000.0,
      restrictions: &[
        "Cross 9.4 DME at 2500 ft or above",
        "Cross R-149 at 3100 ft or above",
        "Cross R-248/15 DME at 4300 ft or above",
        "Cross ZULU at FL080 or above",
        "Pamplona transition: Cross R-317 at FL240 or above",
      ],
      military: true,
    },
    Sid {
      designator: "ZULU_RWY30",
      name: "ZULU DEPARTURE",
      runways: RWY_30,
      description: "Climb R-303 ZZA to 5 DME (1700 ft min). Turn left heading 219° to intercept R-248/15 DME (4300 ft min). Direct to ZULU (FL080 min).",
      fixes: vec![
        fix("5DME_303", 303.0, 5.0),
        fix("R248_15DME", 248.0, 15.0),
        zulu(),
      ],
      final_altitude: 24000.0,
      restrictions: &[
        "Cross 5 DME at 1700 ft or above",
        "Cross R-248/15 DME at 4300 ft or above",
        "Cross ZULU at FL080 or above",
      ],
      military: true,
    },
  ]
});

/// Case-insensitive lookup by designator.
pub fn sid(designator: &str) -> Option<&'static Sid> {
  let designator = designator.trim();
  SIDS
    .iter()
    .find(|s| s.designator.eq_ignore_ascii_case(designator))
}

pub fn sids_for_runway(runway: &str) -> impl Iterator<Item = &'static Sid> {
  let runway = runway.trim().to_owned();
  SIDS.iter().filter(move |s| s.serves_runway(&runway))
}
