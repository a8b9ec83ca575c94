mod banking;
mod login;
