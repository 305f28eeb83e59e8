use tabled::Table;

use crate::{
    cli::fail,
    service::{ServiceRegistry, apply_limit},
    types::PlaylistTableRow,
    warning,
};

pub async fn playlists(registry: &ServiceRegistry, label: &str, limit: usize) {
    let service = match registry.resolve(label) {
        Ok(service) => service,
        Err(e) => fail(e),
    };

    let mut playlists = match service.get_playlists().await {
        Ok(playlists) => playlists,
        Err(e) => fail(e),
    };

    if playlists.is_empty() {
        warning!("No playlists found on {}", service.name());
        return;
    }

    playlists.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    apply_limit(&mut playlists, limit);

    let rows: Vec<PlaylistTableRow> = playlists.iter().map(PlaylistTableRow::from).collect();
    println!("{}", Table::new(rows));
}
