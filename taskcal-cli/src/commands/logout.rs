use anyhow::Result;

use crate::App;

pub fn run(app: &mut App) -> Result<()> {
    match app.remembered_user() {
        Some(user) => {
            app.teardown()?;
            println!("Logged out {}", user.email);
        }
        None => println!("Not logged in."),
    }

    Ok(())
}
