pub mod badges;
pub mod health;
pub mod interactions;

#[cfg(test)]
mod test_state;
