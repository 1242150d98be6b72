use crate::dataset::Dataset;
use crate::types::*;

use std::path::Path;

/// Create a Village with only required fields set.
pub(crate) fn village(id: &str, name: &str, province: &str) -> Village {
    Village {
        id: id.to_string(),
        name: name.to_string(),
        province: province.to_string(),
        district: None,
        idm_score: None,
        idm_category: None,
        readiness: None,
    }
}

/// Create an Innovator.
pub(crate) fn innovator(id: &str, name: &str, category: &str) -> Innovator {
    Innovator {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        villages_served: None,
    }
}

/// Create an Innovation.
pub(crate) fn innovation(
    id: &str,
    name: &str,
    category: &str,
    innovator_id: &str,
    year: i32,
) -> Innovation {
    Innovation {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        innovator_id: innovator_id.to_string(),
        year: Some(year),
        claim_count: None,
    }
}

/// Create a Claim without evidence.
pub(crate) fn claim(id: &str, village_id: &str, innovation_id: &str, status: ClaimStatus) -> Claim {
    Claim {
        id: id.to_string(),
        village_id: village_id.to_string(),
        innovation_id: innovation_id.to_string(),
        status,
        evidence: vec![],
        submitted_year: None,
    }
}

fn with_year(mut claim: Claim, year: i32) -> Claim {
    claim.submitted_year = Some(year);
    claim
}

/// Collections of a small dataset.
///
/// Verified adoptions: Sukamaju (v1) adopted i1, i2, i3; Cibodas (v2) adopted i1, i3; Bantul (v3)
/// adopted i1. Ambarawa (v4) has a pending claim and Penglipuran (v5) a rejected one. Claim c9
/// references a village that does not exist.
pub(crate) fn collections() -> (Vec<Village>, Vec<Innovator>, Vec<Innovation>, Vec<Claim>) {
    let mut villages = vec![
        village("v1", "Sukamaju", "Jawa Barat"),
        village("v2", "Cibodas", "Jawa Barat"),
        village("v3", "Bantul", "DI Yogyakarta"),
        village("v4", "Ambarawa", "Jawa Tengah"),
        village("v5", "Penglipuran", "Bali"),
    ];
    villages[0].idm_score = Some(0.85);
    villages[0].readiness = Some(Readiness {
        infrastructure: 80.0,
        digital_literacy: 70.0,
        governance: 60.0,
        economy: 50.0,
    });
    villages[1].idm_score = Some(0.72);
    villages[1].readiness = Some(Readiness {
        infrastructure: 60.0,
        digital_literacy: 50.0,
        governance: 40.0,
        economy: 30.0,
    });
    villages[2].idm_score = Some(0.65);
    villages[3].idm_category = Some(IdmCategory::Tertinggal);

    let innovators = vec![
        innovator("n1", "Tani Digital", "Startup"),
        innovator("n2", "Sehat Desa", "Lembaga Swadaya"),
        innovator("n3", "Kampus Merdeka", "Akademisi"),
    ];

    let innovations = vec![
        innovation("i1", "Pupuk Pintar", "Pertanian", "n1", 2020),
        innovation("i2", "eFishery Desa", "Perikanan", "n1", 2021),
        innovation("i3", "Telemedis", "Kesehatan", "n2", 2021),
        innovation("i4", "Posyandu Digital", "Kesehatan", "n2", 2019),
    ];

    let claims = vec![
        with_year(claim("c1", "v1", "i1", ClaimStatus::Terverifikasi), 2021),
        with_year(claim("c2", "v1", "i2", ClaimStatus::Terverifikasi), 2022),
        with_year(claim("c3", "v1", "i3", ClaimStatus::Terverifikasi), 2022),
        with_year(claim("c4", "v2", "i1", ClaimStatus::Terverifikasi), 2021),
        with_year(claim("c5", "v2", "i3", ClaimStatus::Terverifikasi), 2023),
        with_year(claim("c6", "v3", "i1", ClaimStatus::Terverifikasi), 2022),
        with_year(claim("c7", "v4", "i2", ClaimStatus::Menunggu), 2023),
        with_year(claim("c8", "v5", "i3", ClaimStatus::Ditolak), 2023),
        with_year(claim("c9", "v9", "i1", ClaimStatus::Terverifikasi), 2023),
    ];

    (villages, innovators, innovations, claims)
}

/// Create the small dataset described in [collections].
pub(crate) fn dataset() -> Dataset {
    let (villages, innovators, innovations, claims) = collections();
    Dataset::new(villages, innovators, innovations, claims)
}

/// Write the collections of the small dataset as `<collection>.json` files.
pub(crate) fn write_collections(dir: &Path) {
    let (villages, innovators, innovations, claims) = collections();
    write_collection(dir, Village::COLLECTION, &villages);
    write_collection(dir, Innovator::COLLECTION, &innovators);
    write_collection(dir, Innovation::COLLECTION, &innovations);
    write_collection(dir, Claim::COLLECTION, &claims);
}

/// Write a single collection file.
pub(crate) fn write_collection<T: serde::Serialize>(dir: &Path, collection: &str, documents: &[T]) {
    let path = dir.join(format!("{collection}.json"));
    std::fs::write(path, serde_json::to_vec_pretty(documents).unwrap()).unwrap();
}
