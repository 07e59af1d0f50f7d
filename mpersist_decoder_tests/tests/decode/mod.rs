mod cycles;
mod extended;
mod versions;
